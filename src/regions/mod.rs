//! # Region Builder
//!
//! Partitions substrate nodes into non-overlapping regions:
//!
//! 1. every strong-backbone component of size ≥ 2 becomes a `component` region;
//! 2. every node still uncovered is grouped with the nodes sharing its exact
//!    mutual-neighborhood patch into a `patch` region (singletons included).
//!
//! Regions are then sorted (component kind first, larger first, smallest
//! member ID) and re-IDed `r_0, r_1, …`. Every node lands in exactly one
//! region.

pub mod profiler;

use std::collections::BTreeMap;

use hashbrown::HashSet;
use tracing::debug;

use crate::model::{GeometricSubstrate, NodeProfile, Region, RegionKind};

pub use profiler::profile_regions;

pub fn build_regions(substrate: &GeometricSubstrate) -> Vec<Region> {
    let mut covered: HashSet<&str> = HashSet::new();
    let mut regions: Vec<Region> = Vec::new();

    // --- 1. components ---
    for component in substrate.topology.components.iter().filter(|c| c.size >= 2) {
        let members: Vec<&NodeProfile> = component
            .node_ids
            .iter()
            .filter_map(|id| substrate.node(id))
            .filter(|n| !covered.contains(n.paragraph_id.as_str()))
            .collect();
        if members.is_empty() {
            continue;
        }
        covered.extend(members.iter().map(|n| n.paragraph_id.as_str()));
        regions.push(region_from(RegionKind::Component, &members, Some(component.id.clone())));
    }

    // --- 2. patches over what is left ---
    let mut patches: BTreeMap<&[String], Vec<&NodeProfile>> = BTreeMap::new();
    for node in &substrate.nodes {
        if covered.contains(node.paragraph_id.as_str()) {
            continue;
        }
        patches.entry(node.mutual_neighborhood_patch.as_slice()).or_default().push(node);
    }
    for members in patches.values() {
        regions.push(region_from(RegionKind::Patch, members, None));
    }

    regions.sort_by(|a, b| {
        a.kind
            .cmp(&b.kind)
            .then_with(|| b.size().cmp(&a.size()))
            .then_with(|| a.node_ids[0].cmp(&b.node_ids[0]))
    });
    for (i, region) in regions.iter_mut().enumerate() {
        region.id = format!("r_{i}");
    }

    debug!(
        regions = regions.len(),
        component_regions = regions.iter().filter(|r| r.kind == RegionKind::Component).count(),
        "regions built"
    );
    regions
}

fn region_from(kind: RegionKind, members: &[&NodeProfile], source_component: Option<String>) -> Region {
    let mut node_ids: Vec<String> = members.iter().map(|n| n.paragraph_id.clone()).collect();
    node_ids.sort();
    let mut statement_ids: Vec<String> = members
        .iter()
        .flat_map(|n| n.statement_ids.iter().cloned())
        .collect();
    statement_ids.sort();
    statement_ids.dedup();
    let mut model_indices: Vec<usize> = members.iter().map(|n| n.model_index).collect();
    model_indices.sort_unstable();
    model_indices.dedup();
    Region {
        id: String::new(),
        kind,
        node_ids,
        statement_ids,
        model_indices,
        source_component,
    }
}

/// Nodes covered more than once, and nodes never covered. Both empty for a
/// valid partition.
pub fn coverage_gaps(substrate: &GeometricSubstrate, regions: &[Region]) -> (Vec<String>, Vec<String>) {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut duplicated = Vec::new();
    for id in regions.iter().flat_map(|r| r.node_ids.iter()) {
        if !seen.insert(id.as_str()) {
            duplicated.push(id.clone());
        }
    }
    let missing = substrate
        .node_ids()
        .filter(|id| !seen.contains(id))
        .map(str::to_string)
        .collect();
    (duplicated, missing)
}
