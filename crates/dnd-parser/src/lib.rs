mod exercise;
mod xml;

pub use exercise::{parse_exercise, parse_exercise_document, DRAG_AND_DROP_INPUT_TAG};
pub use xml::{parse_xml_document, XmlDocument, XmlElementNode, XmlNode, XmlTextNode};
