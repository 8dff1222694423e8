//! The Region Adjacency Graph: construction, merging, agglomeration and
//! inclusion removal.
//!
//! Nodes and edges live in dense, id-indexed `Vec<Option<_>>` tables with
//! free-lists for reuse, rather than a map-of-maps — this keeps neighbor
//! iteration and existence checks cache-friendly and avoids per-merge hash
//! map churn on the hot path. See the design notes for the rationale.

use std::collections::HashMap;

use crate::error::RagError;
use crate::feature::FeatureManager;
use crate::newtypes::{EdgeId, ExclusionTag, Generation, NodeId};
use crate::priority::PriorityFn;
use crate::voxel::{boundary_sample, offset_coord, Connectivity, LabelVolume, ProbabilityVolume};

/// Construction-time configuration for a [`Rag`].
#[derive(Debug, Clone)]
pub struct RagConfig {
    pub connectivity: Connectivity,
    /// When true (the default), label `0` is background: it is never a
    /// node, but mediates adjacency between the regions it borders.
    pub nozeros: bool,
    /// Optional per-voxel exclusion tags, same shape as the label volume.
    pub exclusion: Option<LabelVolume>,
    /// When true, boundary voxel coordinates are retained per edge so
    /// that [`Rag::get_ucm`] can be computed after agglomeration. This
    /// trades memory for the ability to produce a UCM; leave it off for
    /// plain agglomeration runs.
    pub track_ucm: bool,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::Face,
            nozeros: true,
            exclusion: None,
            track_ucm: false,
        }
    }
}

#[derive(Debug, Clone)]
struct NodeRecord<FM: FeatureManager> {
    voxel_count: u64,
    cache: FM::NodeCache,
    exclusion: ExclusionTag,
    frozen: bool,
    neighbors: Vec<EdgeId>,
}

#[derive(Debug, Clone)]
struct EdgeRecord<FM: FeatureManager> {
    u: NodeId,
    v: NodeId,
    cache: FM::EdgeCache,
    boundary_count: u64,
    frozen: bool,
    origin_ids: Vec<usize>,
}

impl<FM: FeatureManager> EdgeRecord<FM> {
    fn other(&self, node: NodeId) -> NodeId {
        if node == self.u {
            self.v
        } else {
            self.u
        }
    }
}

fn canon(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a.get() <= b.get() {
        (a, b)
    } else {
        (b, a)
    }
}

/// Outcome of a single [`Rag::merge`] call.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub survivor: NodeId,
    pub absorbed: NodeId,
    /// Edges incident on the survivor that were combined or renamed as a
    /// result of this merge, and may need a fresh priority.
    pub touched_edges: Vec<EdgeId>,
    /// Origin-edge ids (only nonempty when UCM tracking is enabled) whose
    /// merge level the caller should record.
    pub resolved_origin_ids: Vec<usize>,
}

/// Summary returned by [`Rag::agglomerate`] and [`Rag::agglomerate_ladder`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AgglomerationReport {
    pub merges: usize,
    pub forbidden: usize,
}

/// Summary returned by [`Rag::remove_inclusions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InclusionReport {
    pub merged: usize,
    pub skipped: usize,
}

/// A Region Adjacency Graph over a feature manager `FM`.
pub struct Rag<FM: FeatureManager> {
    feature_manager: FM,
    shape: Vec<usize>,
    nodes: Vec<Option<NodeRecord<FM>>>,
    edges: Vec<Option<EdgeRecord<FM>>>,
    edge_generation: Vec<Generation>,
    pair_lookup: HashMap<(u32, u32), EdgeId>,
    label_to_node: HashMap<i64, NodeId>,
    labels: LabelVolume,
    alias: Vec<Option<NodeId>>,
    nozeros: bool,
    track_ucm: bool,
    origin_voxels: Vec<Vec<Vec<usize>>>,
    origin_level: Vec<Option<f64>>,
}

impl<FM: FeatureManager> Rag<FM> {
    /// Builds a RAG from a label volume and probability map.
    pub fn build(
        labels: LabelVolume,
        probabilities: ProbabilityVolume,
        feature_manager: FM,
        config: RagConfig,
    ) -> Result<Self, RagError> {
        if labels.shape() != probabilities.shape() {
            return Err(RagError::ShapeMismatch {
                label_shape: labels.shape().to_vec(),
                probability_shape: probabilities.shape().to_vec(),
            });
        }
        if labels.is_empty() {
            return Err(RagError::EmptyVolume);
        }
        if let Some(&neg) = labels.iter().find(|&&v| v < 0) {
            return Err(RagError::NegativeLabel { value: neg });
        }

        let shape: Vec<usize> = labels.shape().to_vec();
        let ndim = shape.len();

        let mut distinct: Vec<i64> = labels
            .iter()
            .copied()
            .filter(|&l| !(config.nozeros && l == 0))
            .collect();
        distinct.sort_unstable();
        distinct.dedup();

        let mut label_to_node = HashMap::with_capacity(distinct.len());
        let mut nodes = Vec::with_capacity(distinct.len());
        for (i, &label) in distinct.iter().enumerate() {
            label_to_node.insert(label, NodeId::from_index(i));
            nodes.push(Some(NodeRecord {
                voxel_count: 0,
                cache: feature_manager.create_node_cache(),
                exclusion: ExclusionTag::NONE,
                frozen: false,
                neighbors: Vec::new(),
            }));
        }

        // `rag.labels` is populated at the very end of this function; the
        // sweep below reads the `labels`/`probabilities` parameters
        // directly so that mutating `rag` (via `node_mut`/`accumulate_edge`,
        // both `&mut self`) doesn't alias a live borrow of `rag.labels`.
        let mut rag = Rag {
            feature_manager,
            shape: shape.clone(),
            nodes,
            edges: Vec::new(),
            edge_generation: Vec::new(),
            pair_lookup: HashMap::new(),
            label_to_node,
            labels: LabelVolume::from_elem(ndarray::IxDyn(&[]), 0),
            alias: vec![None; distinct.len()],
            nozeros: config.nozeros,
            track_ucm: config.track_ucm,
            origin_voxels: Vec::new(),
            origin_level: Vec::new(),
        };

        let forward = forward_half(config.connectivity.offsets(ndim));
        let full = config.connectivity.offsets(ndim);

        for (coord, &label) in labels.indexed_iter() {
            let coord: Vec<usize> = coord.slice().to_vec();
            let p_self = probabilities[ndarray::IxDyn(&coord)];

            if !(config.nozeros && label == 0) {
                #[allow(clippy::unwrap_used)]
                let node_id = *rag.label_to_node.get(&label).unwrap();
                #[allow(clippy::unwrap_used)]
                let record = rag.nodes[node_id.index()].as_mut().unwrap();
                record.voxel_count += 1;
                rag.feature_manager.update_node(&mut record.cache, p_self);

                for offset in &forward {
                    let Some(ncoord) = offset_coord(&coord, offset, &shape) else {
                        continue;
                    };
                    let nlabel = labels[ndarray::IxDyn(&ncoord)];
                    if nlabel == label || (config.nozeros && nlabel == 0) {
                        continue;
                    }
                    #[allow(clippy::unwrap_used)]
                    let other_node = *rag.label_to_node.get(&nlabel).unwrap();
                    let p_other = probabilities[ndarray::IxDyn(&ncoord)];
                    let sample = boundary_sample(p_self, Some(p_other));
                    rag.accumulate_edge(node_id, other_node, sample, &[coord.clone(), ncoord]);
                }
            } else if config.nozeros {
                let mut seen: Vec<i64> = Vec::new();
                for offset in &full {
                    let Some(ncoord) = offset_coord(&coord, offset, &shape) else {
                        continue;
                    };
                    let nlabel = labels[ndarray::IxDyn(&ncoord)];
                    if nlabel != 0 && !seen.contains(&nlabel) {
                        seen.push(nlabel);
                    }
                }
                for i in 0..seen.len() {
                    for j in (i + 1)..seen.len() {
                        #[allow(clippy::unwrap_used)]
                        let a = *rag.label_to_node.get(&seen[i]).unwrap();
                        #[allow(clippy::unwrap_used)]
                        let b = *rag.label_to_node.get(&seen[j]).unwrap();
                        rag.accumulate_edge(a, b, p_self, &[coord.clone()]);
                    }
                }
            }
        }

        rag.labels = labels;

        if let Some(exclusion) = &config.exclusion {
            rag.assign_exclusion_tags(exclusion)?;
            rag.drop_excluded_edges();
        }

        Ok(rag)
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeRecord<FM> {
        #[allow(clippy::unwrap_used)]
        self.nodes[id.index()].as_mut().unwrap()
    }

    fn accumulate_edge(&mut self, a: NodeId, b: NodeId, sample: f64, stamp_voxels: &[Vec<usize>]) {
        let (lo, hi) = canon(a, b);
        let key = (lo.get(), hi.get());
        let edge_id = if let Some(&id) = self.pair_lookup.get(&key) {
            id
        } else {
            let id = EdgeId::from_index(self.edges.len());
            self.edges.push(Some(EdgeRecord {
                u: lo,
                v: hi,
                cache: self.feature_manager.create_edge_cache(),
                boundary_count: 0,
                frozen: false,
                origin_ids: Vec::new(),
            }));
            self.edge_generation.push(0);
            self.pair_lookup.insert(key, id);
            self.node_mut(lo).neighbors.push(id);
            self.node_mut(hi).neighbors.push(id);
            if self.track_ucm {
                self.origin_voxels.push(Vec::new());
                self.origin_level.push(None);
            }
            id
        };

        if self.track_ucm {
            let origin_id = edge_id.index();
            for voxel in stamp_voxels {
                self.origin_voxels[origin_id].push(voxel.clone());
            }
            #[allow(clippy::unwrap_used)]
            let rec = self.edges[edge_id.index()].as_mut().unwrap();
            if !rec.origin_ids.contains(&origin_id) {
                rec.origin_ids.push(origin_id);
            }
        }

        #[allow(clippy::unwrap_used)]
        let rec = self.edges[edge_id.index()].as_mut().unwrap();
        rec.boundary_count += 1;
        self.feature_manager.update_edge(&mut rec.cache, sample);
    }

    fn assign_exclusion_tags(&mut self, exclusion: &LabelVolume) -> Result<(), RagError> {
        if exclusion.shape() != self.shape.as_slice() {
            return Err(RagError::ShapeMismatch {
                label_shape: self.shape.clone(),
                probability_shape: exclusion.shape().to_vec(),
            });
        }
        let mut tallies: HashMap<usize, HashMap<i64, u64>> = HashMap::new();
        for (coord, &label) in self.labels.indexed_iter() {
            if self.nozeros && label == 0 {
                continue;
            }
            let tag = exclusion[coord];
            if tag == 0 {
                continue;
            }
            #[allow(clippy::unwrap_used)]
            let node = *self.label_to_node.get(&label).unwrap();
            *tallies.entry(node.index()).or_default().entry(tag).or_insert(0) += 1;
        }
        for (idx, counts) in tallies {
            #[allow(clippy::unwrap_used)]
            let best = counts
                .into_iter()
                .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
                .unwrap()
                .0;
            #[allow(clippy::unwrap_used)]
            self.nodes[idx].as_mut().unwrap().exclusion = ExclusionTag(best);
        }
        Ok(())
    }

    fn drop_excluded_edges(&mut self) {
        let mut to_drop = Vec::new();
        for (i, slot) in self.edges.iter().enumerate() {
            if let Some(rec) = slot {
                #[allow(clippy::unwrap_used)]
                let tag_u = self.nodes[rec.u.index()].as_ref().unwrap().exclusion;
                #[allow(clippy::unwrap_used)]
                let tag_v = self.nodes[rec.v.index()].as_ref().unwrap().exclusion;
                if tag_u.conflicts_with(tag_v) {
                    to_drop.push(EdgeId::from_index(i));
                }
            }
        }
        for edge_id in to_drop {
            #[allow(clippy::unwrap_used)]
            let rec = self.edges[edge_id.index()].take().unwrap();
            self.pair_lookup.remove(&(rec.u.get(), rec.v.get()));
            self.node_mut(rec.u).neighbors.retain(|&e| e != edge_id);
            self.node_mut(rec.v).neighbors.retain(|&e| e != edge_id);
        }
    }

    /// Merges `a` into `b` (or vice versa; the lower-id node always
    /// survives), rewiring edges and combining feature caches. Returns the
    /// set of edges whose priority a caller should recompute.
    pub fn merge(&mut self, x: NodeId, y: NodeId) -> Result<MergeOutcome, RagError> {
        let node_x = self.nodes[x.index()].as_ref().ok_or(RagError::UnknownNode { node: x })?;
        let node_y = self.nodes[y.index()].as_ref().ok_or(RagError::UnknownNode { node: y })?;
        if node_x.frozen || node_y.frozen {
            return Err(RagError::MergeForbidden { u: x, v: y });
        }
        if node_x.exclusion.conflicts_with(node_y.exclusion) {
            self.node_mut(x).frozen = true;
            self.node_mut(y).frozen = true;
            return Err(RagError::MergeForbidden { u: x, v: y });
        }

        let (survivor, absorbed) = canon(x, y);

        #[allow(clippy::unwrap_used)]
        let absorbed_cache = self.nodes[absorbed.index()].as_ref().unwrap().cache.clone();
        #[allow(clippy::unwrap_used)]
        let absorbed_voxels = self.nodes[absorbed.index()].as_ref().unwrap().voxel_count;
        #[allow(clippy::unwrap_used)]
        let absorbed_neighbors = self.nodes[absorbed.index()].as_ref().unwrap().neighbors.clone();

        {
            #[allow(clippy::unwrap_used)]
            let survivor_rec = self.nodes[survivor.index()].as_mut().unwrap();
            self.feature_manager.combine_nodes(&mut survivor_rec.cache, &absorbed_cache);
            survivor_rec.voxel_count += absorbed_voxels;
        }

        let mut touched_edges = Vec::new();
        let mut resolved_origin_ids = Vec::new();
        let mut connecting_edge = None;

        for edge_id in absorbed_neighbors {
            #[allow(clippy::unwrap_used)]
            let other = self.edges[edge_id.index()].as_ref().unwrap().other(absorbed);
            if other == survivor {
                connecting_edge = Some(edge_id);
                continue;
            }

            let existing_key = (canon(survivor, other).0.get(), canon(survivor, other).1.get());
            if let Some(&existing_id) = self.pair_lookup.get(&existing_key) {
                #[allow(clippy::unwrap_used)]
                let removed = self.edges[edge_id.index()].take().unwrap();
                self.pair_lookup.remove(&(removed.u.get(), removed.v.get()));
                self.node_mut(other).neighbors.retain(|&e| e != edge_id);

                #[allow(clippy::unwrap_used)]
                let existing = self.edges[existing_id.index()].as_mut().unwrap();
                self.feature_manager.combine_edges(&mut existing.cache, &removed.cache);
                existing.boundary_count += removed.boundary_count;
                existing.origin_ids.extend(removed.origin_ids);
                self.edge_generation[existing_id.index()] += 1;
                touched_edges.push(existing_id);
            } else {
                #[allow(clippy::unwrap_used)]
                let rec = self.edges[edge_id.index()].as_mut().unwrap();
                let (lo, hi) = canon(survivor, other);
                rec.u = lo;
                rec.v = hi;
                self.pair_lookup.remove(&(canon(absorbed, other).0.get(), canon(absorbed, other).1.get()));
                self.pair_lookup.insert((lo.get(), hi.get()), edge_id);
                self.node_mut(survivor).neighbors.push(edge_id);
                self.edge_generation[edge_id.index()] += 1;
                touched_edges.push(edge_id);
            }
        }

        if let Some(edge_id) = connecting_edge {
            #[allow(clippy::unwrap_used)]
            let removed = self.edges[edge_id.index()].take().unwrap();
            self.pair_lookup.remove(&(removed.u.get(), removed.v.get()));
            self.node_mut(survivor).neighbors.retain(|&e| e != edge_id);
            resolved_origin_ids = removed.origin_ids;
        }

        self.nodes[absorbed.index()] = None;
        self.alias[absorbed.index()] = Some(survivor);

        Ok(MergeOutcome {
            survivor,
            absorbed,
            touched_edges,
            resolved_origin_ids,
        })
    }

    /// Merges every edge in priority order whose priority does not exceed
    /// `threshold`.
    pub fn agglomerate<P: PriorityFn<FM>>(&mut self, threshold: f64, priority_fn: &P) -> AgglomerationReport {
        let mut queue = crate::pqueue::PriorityQueue::new();
        for edge_id in self.live_edges() {
            let p = priority_fn.priority(self, edge_id);
            queue.push(p, edge_id, self.edge_generation[edge_id.index()]);
        }

        let mut report = AgglomerationReport::default();
        while let Some((priority, edge_id, generation)) = queue.pop() {
            if priority > threshold {
                break;
            }
            if generation != self.edge_generation[edge_id.index()] {
                continue;
            }
            let Some(rec) = &self.edges[edge_id.index()] else {
                continue;
            };
            if rec.frozen {
                continue;
            }
            let (u, v) = (rec.u, rec.v);

            match self.merge(u, v) {
                Ok(outcome) => {
                    report.merges += 1;
                    if self.track_ucm {
                        for id in outcome.resolved_origin_ids {
                            self.origin_level[id] = Some(priority);
                        }
                    }
                    for touched in outcome.touched_edges {
                        if let Some(touched_rec) = &self.edges[touched.index()] {
                            if touched_rec.frozen {
                                continue;
                            }
                            let np = priority_fn.priority(self, touched);
                            queue.push(np, touched, self.edge_generation[touched.index()]);
                        }
                    }
                }
                Err(RagError::MergeForbidden { .. }) => {
                    report.forbidden += 1;
                    if let Some(rec) = self.edges[edge_id.index()].as_mut() {
                        rec.frozen = true;
                    }
                }
                Err(RagError::UnknownNode { .. }) => {}
            }
        }
        report
    }

    /// One-shot cleanup pass: merges edges in priority order but only
    /// when at least one endpoint has fewer than `min_size` voxels.
    pub fn agglomerate_ladder<P: PriorityFn<FM>>(&mut self, min_size: usize, priority_fn: &P) -> AgglomerationReport {
        let mut queue = crate::pqueue::PriorityQueue::new();
        for edge_id in self.live_edges() {
            let p = priority_fn.priority(self, edge_id);
            queue.push(p, edge_id, self.edge_generation[edge_id.index()]);
        }

        let mut report = AgglomerationReport::default();
        while let Some((_priority, edge_id, generation)) = queue.pop() {
            if generation != self.edge_generation[edge_id.index()] {
                continue;
            }
            let Some(rec) = &self.edges[edge_id.index()] else {
                continue;
            };
            if rec.frozen {
                continue;
            }
            let (u, v) = (rec.u, rec.v);
            #[allow(clippy::unwrap_used)]
            let small_enough = self.nodes[u.index()].as_ref().unwrap().voxel_count < min_size as u64
                || self.nodes[v.index()].as_ref().unwrap().voxel_count < min_size as u64;
            if !small_enough {
                continue;
            }

            match self.merge(u, v) {
                Ok(outcome) => {
                    report.merges += 1;
                    for touched in outcome.touched_edges {
                        if let Some(touched_rec) = &self.edges[touched.index()] {
                            if touched_rec.frozen {
                                continue;
                            }
                            let np = priority_fn.priority(self, touched);
                            queue.push(np, touched, self.edge_generation[touched.index()]);
                        }
                    }
                }
                Err(RagError::MergeForbidden { .. }) => {
                    report.forbidden += 1;
                    if let Some(rec) = self.edges[edge_id.index()].as_mut() {
                        rec.frozen = true;
                    }
                }
                Err(RagError::UnknownNode { .. }) => {}
            }
        }
        report
    }

    /// Produces a UCM over the original voxel grid. Only meaningful when
    /// the RAG was built with `track_ucm: true` and agglomeration was run
    /// to `f64::INFINITY`.
    pub fn get_ucm(&self) -> ProbabilityVolume {
        let mut out = ProbabilityVolume::from_elem(self.labels.raw_dim(), f64::INFINITY);
        for (origin_id, voxels) in self.origin_voxels.iter().enumerate() {
            let level = self.origin_level[origin_id].unwrap_or(f64::INFINITY);
            for coord in voxels {
                let idx = ndarray::IxDyn(coord);
                let current = out[idx.clone()];
                out[idx] = current.min(level);
            }
        }
        out
    }

    /// Reconstructs a segmentation over the original voxel grid, mapping
    /// each voxel to the ordinal of the node it currently belongs to.
    pub fn get_segmentation(&self) -> LabelVolume {
        let mut out = LabelVolume::zeros(self.labels.raw_dim());
        for (coord, &label) in self.labels.indexed_iter() {
            if self.nozeros && label == 0 {
                continue;
            }
            #[allow(clippy::unwrap_used)]
            let initial = *self.label_to_node.get(&label).unwrap();
            let current = self.resolve(initial);
            out[coord] = current.get() as i64;
        }
        out
    }

    fn resolve(&self, mut id: NodeId) -> NodeId {
        while let Some(next) = self.alias[id.index()] {
            id = next;
        }
        id
    }

    /// Merges every node with exactly one neighbor into that neighbor,
    /// ignoring priority, until no inclusions remain.
    pub fn remove_inclusions(&mut self) -> InclusionReport {
        let mut report = InclusionReport::default();
        loop {
            let candidates: Vec<(NodeId, NodeId)> = self
                .nodes
                .iter()
                .enumerate()
                .filter_map(|(i, slot)| slot.as_ref().map(|rec| (i, rec)))
                .filter(|(_, rec)| rec.neighbors.len() == 1)
                .filter_map(|(i, rec)| {
                    let edge_id = rec.neighbors[0];
                    self.edges[edge_id.index()]
                        .as_ref()
                        .map(|e| (NodeId::from_index(i), e.other(NodeId::from_index(i))))
                })
                .collect();

            if candidates.is_empty() {
                break;
            }

            let mut progressed = false;
            for (node, neighbor) in candidates {
                if self.nodes[node.index()].is_none() || self.nodes[neighbor.index()].is_none() {
                    continue;
                }
                #[allow(clippy::unwrap_used)]
                if self.nodes[node.index()].as_ref().unwrap().neighbors.len() != 1 {
                    continue;
                }
                match self.merge(node, neighbor) {
                    Ok(_) => {
                        report.merged += 1;
                        progressed = true;
                    }
                    Err(RagError::MergeForbidden { .. }) => {
                        report.skipped += 1;
                    }
                    Err(RagError::UnknownNode { .. }) => {}
                }
            }
            if !progressed {
                break;
            }
        }
        report
    }

    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|s| s.is_some()).count()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().filter(|s| s.is_some()).count()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn live_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|_| NodeId::from_index(i)))
    }

    pub fn live_edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|_| EdgeId::from_index(i)))
    }

    pub fn edge_endpoints(&self, edge: EdgeId) -> Option<(NodeId, NodeId)> {
        self.edges[edge.index()].as_ref().map(|e| (e.u, e.v))
    }

    pub fn node_voxel_count(&self, node: NodeId) -> u64 {
        self.nodes[node.index()].as_ref().map_or(0, |n| n.voxel_count)
    }

    pub fn node_cache(&self, node: NodeId) -> &FM::NodeCache {
        #[allow(clippy::unwrap_used)]
        &self.nodes[node.index()].as_ref().unwrap().cache
    }

    pub fn edge_cache(&self, edge: EdgeId) -> &FM::EdgeCache {
        #[allow(clippy::unwrap_used)]
        &self.edges[edge.index()].as_ref().unwrap().cache
    }

    pub fn edge_boundary_count(&self, edge: EdgeId) -> u64 {
        self.edges[edge.index()].as_ref().map_or(0, |e| e.boundary_count)
    }

    pub fn neighbors(&self, node: NodeId) -> &[EdgeId] {
        self.nodes[node.index()].as_ref().map_or(&[], |n| &n.neighbors)
    }

    pub fn feature_manager(&self) -> &FM {
        &self.feature_manager
    }

    pub fn edge_is_frozen(&self, edge: EdgeId) -> bool {
        self.edges[edge.index()].as_ref().is_some_and(|e| e.frozen)
    }

    /// A frozen node still counts for adjacency but is refused by every
    /// future `merge` call touching it, for the rest of this RAG's life.
    pub fn node_is_frozen(&self, node: NodeId) -> bool {
        self.nodes[node.index()].as_ref().is_some_and(|n| n.frozen)
    }

    /// Marks an edge as frozen, excluding it from further agglomeration
    /// or learning proposals until the graph is rebuilt.
    pub fn freeze_edge(&mut self, edge: EdgeId) {
        if let Some(rec) = self.edges[edge.index()].as_mut() {
            rec.frozen = true;
        }
    }
}

/// Returns the subset of `offsets` that is canonical under negation
/// (first nonzero component positive), so a full sweep visits every
/// unordered voxel-neighbor pair exactly once.
fn forward_half(offsets: Vec<Vec<isize>>) -> Vec<Vec<isize>> {
    offsets
        .into_iter()
        .filter(|o| o.iter().find(|&&c| c != 0).is_some_and(|&c| c > 0))
        .collect()
}
