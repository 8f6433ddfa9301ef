//! Hooks for watching an overlay as it happens.

use crate::{
    num::Float,
    turn::{Cluster, Connection, Turn, TurnPhase},
};

/// Receives read-only views of the turns at several stages of an overlay.
///
/// All methods do nothing by default.
pub trait OverlayVisitor<F: Float> {
    fn visit_turns(&mut self, _phase: TurnPhase, _turns: &[Turn<F>]) {}

    fn visit_cluster_connections(
        &mut self,
        _cluster_id: usize,
        _turns: &[Turn<F>],
        _cluster: &Cluster<F>,
        _connections: &[Connection],
    ) {
    }
}

/// A visitor that doesn't look at anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoVisitor;

impl<F: Float> OverlayVisitor<F> for NoVisitor {}

/// Logs every turn at `trace` level, then passes everything on.
pub(crate) struct TraceVisitor<'a, F: Float> {
    pub inner: &'a mut dyn OverlayVisitor<F>,
}

impl<F: Float> OverlayVisitor<F> for TraceVisitor<'_, F> {
    fn visit_turns(&mut self, phase: TurnPhase, turns: &[Turn<F>]) {
        for (i, turn) in turns.iter().enumerate() {
            let [a, b] = &turn.operations;
            log::trace!(
                "{phase:?} turn {i} at {:?}: {:?} {:?}@{:?} {:?} / {:?}@{:?} {:?}{}",
                turn.point,
                turn.method,
                a.seg_id,
                a.fraction,
                a.operation,
                b.seg_id,
                b.fraction,
                b.operation,
                if turn.discarded { " (discarded)" } else { "" },
            );
        }
        self.inner.visit_turns(phase, turns);
    }

    fn visit_cluster_connections(
        &mut self,
        cluster_id: usize,
        turns: &[Turn<F>],
        cluster: &Cluster<F>,
        connections: &[Connection],
    ) {
        log::trace!(
            "cluster {cluster_id} at {:?}: turns {:?}, {} open, connections {connections:?}",
            cluster.point,
            cluster.turns,
            cluster.open_count,
        );
        self.inner
            .visit_cluster_connections(cluster_id, turns, cluster, connections);
    }
}
