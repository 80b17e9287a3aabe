use std::cmp::Ordering;
use std::collections::BTreeMap;

use dnd_core::{Cell, ExerciseDefinition, Point, Submission};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::geometry::GeometryTable;
use crate::normalize::{
    clean_path, flatten_placement, host_path, parse_target_path, point_label, NormalizedPosition,
};

/// How `draggables[id][i]` orders the instances of one draggable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementOrder {
    /// Top-to-bottom, then left-to-right; unresolved instances last.
    #[default]
    Reading,
    /// The order the placements appear in the submission.
    Submission,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexOptions {
    pub order: PlacementOrder,
}

pub type InstanceId = usize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedInstance {
    pub id: InstanceId,
    pub draggable: String,
    /// Flattened path, cells kept.
    pub path: String,
    /// Innermost target the instance sits on, without its cell.
    pub target: Option<String>,
    pub cell: Option<Cell>,
    pub position: Option<Point>,
    pub host: Option<InstanceId>,
    pub children: Vec<InstanceId>,
}

impl PlacedInstance {
    pub fn x(&self) -> Option<f64> {
        self.position.map(|point| point.x)
    }

    pub fn y(&self) -> Option<f64> {
        self.position.map(|point| point.y)
    }
}

/// Every placement of a submission joined with the exercise geometry.
/// Built fresh for each grading call.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedIndex {
    instances: Vec<PlacedInstance>,
    by_draggable: BTreeMap<String, Vec<InstanceId>>,
}

impl PlacedIndex {
    pub fn build(
        exercise: &ExerciseDefinition,
        submission: &Submission,
        options: IndexOptions,
    ) -> Self {
        let geometry = GeometryTable::from_exercise(exercise);

        let mut instances: Vec<PlacedInstance> = submission
            .events
            .iter()
            .enumerate()
            .map(|(id, event)| {
                let (path, position) = match flatten_placement(&event.placement) {
                    NormalizedPosition::Path(path) => (path, None),
                    NormalizedPosition::Point(point) => (String::new(), Some(point)),
                };
                PlacedInstance {
                    id,
                    draggable: event.draggable.clone(),
                    path,
                    target: None,
                    cell: None,
                    position,
                    host: None,
                    children: Vec::new(),
                }
            })
            .collect();

        // Hosts always sit one level shallower than their children.
        let mut by_depth: Vec<(usize, InstanceId)> = instances
            .iter()
            .map(|instance| (parse_target_path(&instance.path).depth(), instance.id))
            .collect();
        by_depth.sort_by_key(|(depth, id)| (*depth, *id));

        for (depth, id) in by_depth {
            if let Some(point) = instances[id].position {
                instances[id].target = geometry
                    .top_level_target_at(point)
                    .map(|target| target.id.clone());
                continue;
            }

            let parsed = parse_target_path(&instances[id].path);
            if depth == 0 {
                instances[id].position = geometry.resolve(None, &parsed.base);
                instances[id].target = Some(parsed.base.id.clone());
                instances[id].cell = parsed.base.cell;
                continue;
            }

            let Some(link) = parsed.chain.last() else {
                continue;
            };
            instances[id].target = Some(link.slot.id.clone());
            instances[id].cell = link.slot.cell;

            let host_ref = host_path(&instances[id].path).unwrap_or_default();
            let Some(host_id) = find_host(&instances, &link.host, &host_ref, depth - 1) else {
                warn!(
                    "no placed \"{}\" at \"{}\" hosts \"{}\"",
                    link.host, host_ref, instances[id].draggable
                );
                continue;
            };

            instances[id].host = Some(host_id);
            instances[host_id].children.push(id);
            instances[id].position = match (
                instances[host_id].position,
                geometry.resolve(Some(&link.host), &link.slot),
            ) {
                (Some(origin), Some(offset)) => Some(origin.offset(offset)),
                _ => None,
            };
        }

        let mut by_draggable: BTreeMap<String, Vec<InstanceId>> = BTreeMap::new();
        for instance in &instances {
            by_draggable
                .entry(instance.draggable.clone())
                .or_default()
                .push(instance.id);
        }
        if options.order == PlacementOrder::Reading {
            for members in by_draggable.values_mut() {
                members.sort_by(|a, b| reading_order(&instances[*a], &instances[*b]));
            }
        }

        debug!(
            "placed index: {} instances of {} draggables",
            instances.len(),
            by_draggable.len()
        );

        Self {
            instances,
            by_draggable,
        }
    }

    pub fn get(&self, draggable: &str) -> Option<Placements<'_>> {
        self.by_draggable.get(draggable).map(|members| Placements {
            index: self,
            members: members.clone(),
        })
    }

    pub fn instance(&self, id: InstanceId) -> Option<&PlacedInstance> {
        self.instances.get(id)
    }

    pub fn instances(&self) -> &[PlacedInstance] {
        &self.instances
    }

    pub fn members(&self, draggable: &str) -> Option<&[InstanceId]> {
        self.by_draggable.get(draggable).map(Vec::as_slice)
    }

    /// `exact`: the children hosted by `host` are exactly `ids` as a
    /// multiset. Otherwise `ids` is a sub-multiset of them, so a repeated id
    /// needs as many hosted children.
    pub fn contains(&self, host: InstanceId, ids: &[&str], exact: bool) -> bool {
        let Some(instance) = self.instances.get(host) else {
            return false;
        };
        let mut children: Vec<&str> = instance
            .children
            .iter()
            .filter_map(|child| self.instances.get(*child))
            .map(|child| child.draggable.as_str())
            .collect();

        if !exact {
            for id in ids {
                let Some(found) = children.iter().position(|child| child == id) else {
                    return false;
                };
                children.swap_remove(found);
            }
            return true;
        }

        let mut wanted = ids.to_vec();
        children.sort_unstable();
        wanted.sort_unstable();
        children == wanted
    }

    /// Paths (grid cells kept) that hold more than one instance.
    pub fn one_per_target_conflicts(&self) -> Vec<String> {
        let mut occupancy: BTreeMap<&str, usize> = BTreeMap::new();
        for instance in &self.instances {
            if instance.path.is_empty() {
                continue;
            }
            *occupancy.entry(instance.path.as_str()).or_default() += 1;
        }
        occupancy
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(path, _)| path.to_string())
            .collect()
    }
}

/// Instances of one draggable, possibly narrowed by `on`.
#[derive(Debug, Clone)]
pub struct Placements<'a> {
    index: &'a PlacedIndex,
    members: Vec<InstanceId>,
}

impl<'a> Placements<'a> {
    pub fn count(&self) -> usize {
        self.members.len()
    }

    pub fn get(&self, position: usize) -> Option<&'a PlacedInstance> {
        self.members
            .get(position)
            .and_then(|id| self.index.instance(*id))
    }

    pub fn on(&self, target: &str) -> Placements<'a> {
        Placements {
            index: self.index,
            members: filter_on(self.index, &self.members, target),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a PlacedInstance> + '_ {
        self.members
            .iter()
            .filter_map(|id| self.index.instance(*id))
    }
}

pub fn filter_on(index: &PlacedIndex, members: &[InstanceId], target: &str) -> Vec<InstanceId> {
    members
        .iter()
        .copied()
        .filter(|id| {
            index
                .instance(*id)
                .and_then(|instance| instance.target.as_deref())
                == Some(target)
        })
        .collect()
}

fn find_host(
    instances: &[PlacedInstance],
    host: &str,
    host_ref: &str,
    depth: usize,
) -> Option<InstanceId> {
    let candidates = || {
        instances.iter().filter(move |instance| {
            instance.draggable == host && parse_target_path(&instance.path).depth() == depth
        })
    };
    if let Some(found) = candidates().find(|instance| placed_reference(instance) == host_ref) {
        return Some(found.id);
    }
    let cleaned = clean_path(host_ref);
    candidates()
        .find(|instance| clean_path(&placed_reference(instance)) == cleaned)
        .map(|instance| instance.id)
}

/// How a nested placement names this instance as its host. Pixel placements
/// have no path, so they are named by their point.
fn placed_reference(instance: &PlacedInstance) -> String {
    match instance.position {
        Some(point) if instance.path.is_empty() => point_label(point),
        _ => instance.path.clone(),
    }
}

fn reading_order(a: &PlacedInstance, b: &PlacedInstance) -> Ordering {
    match (a.position, b.position) {
        (Some(pa), Some(pb)) => pa
            .y
            .partial_cmp(&pb.y)
            .unwrap_or(Ordering::Equal)
            .then(pa.x.partial_cmp(&pb.x).unwrap_or(Ordering::Equal)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
