use std::fmt;
use log::*;
use crate::model::*;
use crate::topology::Station;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EntityKind { Track, PointMachine, Signal, LevelCrossing }

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Track => "track",
            EntityKind::PointMachine => "point machine",
            EntityKind::Signal => "signal",
            EntityKind::LevelCrossing => "level crossing",
        }
    }
}

/// Every way an interlocking request can be refused. A refused request
/// leaves all state unchanged; there is no retry logic at this layer.
#[derive(Clone, Debug, PartialEq)]
pub enum InterlockingError {
    NotFound(EntityKind, String),
    InvalidEndpoint(String),
    AlreadyTransitioning(String),
    SafetyInterlockViolation { id :String, occupied :Vec<String> },
    InvalidAspect { signal :String, aspect :Aspect },
    InterlockedSignalConflict { signal :String, other :String, aspect :Aspect },
    NotHomeSignal(String),
}

impl fmt::Display for InterlockingError {
    fn fmt(&self, f :&mut fmt::Formatter) -> fmt::Result {
        match self {
            InterlockingError::NotFound(kind, id) =>
                write!(f, "{} not found: {}", kind.as_str(), id),
            InterlockingError::InvalidEndpoint(sel) =>
                write!(f, "invalid endpoint selector: {} (expected START or END)", sel),
            InterlockingError::AlreadyTransitioning(id) =>
                write!(f, "point machine {} is already in transition", id),
            InterlockingError::SafetyInterlockViolation { id, occupied } =>
                write!(f, "safety interlock - tracks occupied: {} (blocking {})",
                       occupied.join(", "), id),
            InterlockingError::InvalidAspect { signal, aspect } =>
                write!(f, "aspect {} not supported by signal {}", aspect.as_str(), signal),
            InterlockingError::InterlockedSignalConflict { signal, other, aspect } =>
                write!(f, "cannot clear {}: interlocked signal {} shows {}",
                       signal, other, aspect.as_str()),
            InterlockingError::NotHomeSignal(id) =>
                write!(f, "signal {} is not a home signal", id),
        }
    }
}

impl std::error::Error for InterlockingError {}

/// What a granted operate request hands back to the caller: the target it
/// must later complete with, and how long the machine will dwell in
/// transition. A no-op request reports zero dwell.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Operated {
    pub target :PointPosition,
    pub transition_ms :u64,
}

impl Station {
    /// Request a position change. On success the machine enters
    /// transition and stays at its old position until `complete` is
    /// called; the external scheduler owns the clock in between.
    pub fn operate(&mut self, machine_id :&str, target :PointPosition)
            -> Result<Operated, InterlockingError> {
        let m = self.machines.get(machine_id)
            .ok_or_else(|| InterlockingError::NotFound(
                EntityKind::PointMachine, machine_id.to_string()))?;

        if m.status == OperatingStatus::InTransition {
            warn!("operate {} refused: already in transition", machine_id);
            return Err(InterlockingError::AlreadyTransitioning(machine_id.to_string()));
        }

        if m.position == target {
            debug!("operate {}: already at {}, nothing to do", machine_id, target.as_str());
            return Ok(Operated { target, transition_ms: 0 });
        }

        // Safety check: every track this machine touches must be clear.
        let mut occupied = Vec::new();
        for c in m.track_connections().iter() {
            let t = self.tracks.get(&c.track)
                .ok_or_else(|| InterlockingError::NotFound(
                    EntityKind::Track, c.track.clone()))?;
            if t.occupied {
                occupied.push(t.id.clone());
            }
        }
        if !occupied.is_empty() {
            warn!("operate {} to {} refused: tracks occupied: {}",
                  machine_id, target.as_str(), occupied.join(", "));
            return Err(InterlockingError::SafetyInterlockViolation {
                id: machine_id.to_string(), occupied });
        }

        let m = self.machines.get_mut(machine_id)
            .ok_or_else(|| InterlockingError::NotFound(
                EntityKind::PointMachine, machine_id.to_string()))?;
        m.status = OperatingStatus::InTransition;
        m.pending = Some(target);
        info!("operate {}: moving to {}, dwell {} ms",
              machine_id, target.as_str(), m.transition_ms);
        Ok(Operated { target, transition_ms: m.transition_ms })
    }

    /// Finish a transition. The caller is trusted to pass the target it
    /// received from `operate`; the recorded pending target is only used
    /// to flag a disagreeing caller in the log.
    pub fn complete(&mut self, machine_id :&str, target :PointPosition)
            -> Result<(), InterlockingError> {
        let m = self.machines.get_mut(machine_id)
            .ok_or_else(|| InterlockingError::NotFound(
                EntityKind::PointMachine, machine_id.to_string()))?;

        if let Some(pending) = m.pending {
            if pending != target {
                warn!("complete {}: caller target {} disagrees with requested {}",
                      machine_id, target.as_str(), pending.as_str());
            }
        }

        m.position = target;
        m.status = OperatingStatus::Connected;
        m.pending = None;
        info!("complete {}: now connected at {}", machine_id, target.as_str());
        Ok(())
    }

    /// Reactive protection for the detection feed: when a track becomes
    /// occupied, every signal protecting it is forced to stop. Returns
    /// the signals that were dropped. Clearing a track triggers nothing.
    pub fn track_occupancy_changed(&mut self, track_id :&str,
                                   was_occupied :bool, is_occupied :bool) -> Vec<String> {
        if was_occupied || !is_occupied {
            return Vec::new();
        }

        let mut affected = Vec::new();
        for s in self.signals.values_mut() {
            if s.protected_tracks.iter().any(|t| t == track_id)
                    && s.current_aspect != Aspect::Red
                    && s.allows(Aspect::Red) {
                warn!("track {} occupied: dropping signal {} from {} to RED",
                      track_id, s.id, s.current_aspect.as_str());
                s.current_aspect = Aspect::Red;
                affected.push(s.id.clone());
            }
        }
        affected.sort();
        affected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::demo_station;

    #[test]
    fn operate_unknown_machine_is_not_found() {
        let mut st = demo_station();
        match st.operate("PM999", PointPosition::Reverse) {
            Err(InterlockingError::NotFound(EntityKind::PointMachine, id)) =>
                assert_eq!(id, "PM999"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn operate_to_current_position_is_a_noop() {
        let mut st = demo_station();
        let r = st.operate("PM001", PointPosition::Normal).unwrap();
        assert_eq!(r, Operated { target: PointPosition::Normal, transition_ms: 0 });
        let m = st.find_point_machine("PM001").unwrap();
        assert_eq!(m.status, OperatingStatus::Connected);
        assert_eq!(m.position, PointPosition::Normal);
        assert!(m.pending.is_none());
    }

    #[test]
    fn operate_then_complete_moves_the_machine() {
        let mut st = demo_station();
        let r = st.operate("PM001", PointPosition::Reverse).unwrap();
        assert_eq!(r.target, PointPosition::Reverse);
        assert_eq!(r.transition_ms, 3000);

        // still connected to the old branch while the machine dwells
        let m = st.find_point_machine("PM001").unwrap();
        assert_eq!(m.status, OperatingStatus::InTransition);
        assert_eq!(m.position, PointPosition::Normal);
        assert_eq!(m.connected_track(), "T1S5");
        assert_eq!(m.pending, Some(PointPosition::Reverse));

        st.complete("PM001", PointPosition::Reverse).unwrap();
        let m = st.find_point_machine("PM001").unwrap();
        assert_eq!(m.status, OperatingStatus::Connected);
        assert_eq!(m.position, PointPosition::Reverse);
        assert_eq!(m.connected_track(), "T5S1");
        assert!(m.pending.is_none());
    }

    #[test]
    fn reentrant_operate_is_refused() {
        let mut st = demo_station();
        st.operate("PM001", PointPosition::Reverse).unwrap();
        match st.operate("PM001", PointPosition::Normal) {
            Err(InterlockingError::AlreadyTransitioning(id)) => assert_eq!(id, "PM001"),
            other => panic!("expected AlreadyTransitioning, got {:?}", other),
        }
        // even a no-op request is refused while dwelling
        assert!(st.operate("PM001", PointPosition::Reverse).is_err());
    }

    #[test]
    fn occupied_track_blocks_the_move_fail_closed() {
        let mut st = demo_station();
        st.set_occupied("T5S1", true, Some("TR204".to_string())).unwrap();

        match st.operate("PM001", PointPosition::Reverse) {
            Err(InterlockingError::SafetyInterlockViolation { id, occupied }) => {
                assert_eq!(id, "PM001");
                assert_eq!(occupied, vec!["T5S1".to_string()]);
            },
            other => panic!("expected SafetyInterlockViolation, got {:?}", other),
        }

        // no partial mutation
        let m = st.find_point_machine("PM001").unwrap();
        assert_eq!(m.status, OperatingStatus::Connected);
        assert_eq!(m.position, PointPosition::Normal);
        assert!(m.pending.is_none());

        // any of the three tracks blocks, including the root
        st.set_occupied("T5S1", false, None).unwrap();
        st.set_occupied("T1S4", true, None).unwrap();
        assert!(st.operate("PM001", PointPosition::Reverse).is_err());

        // and the move goes through once everything clears
        st.set_occupied("T1S4", false, None).unwrap();
        assert!(st.operate("PM001", PointPosition::Reverse).is_ok());
    }

    #[test]
    fn complete_applies_the_callers_target() {
        let mut st = demo_station();
        st.operate("PM002", PointPosition::Reverse).unwrap();
        // a disagreeing caller is logged but trusted
        st.complete("PM002", PointPosition::Normal).unwrap();
        let m = st.find_point_machine("PM002").unwrap();
        assert_eq!(m.position, PointPosition::Normal);
        assert_eq!(m.status, OperatingStatus::Connected);
    }

    #[test]
    fn machines_are_independent() {
        let mut st = demo_station();
        st.operate("PM001", PointPosition::Reverse).unwrap();
        // PM001 dwelling does not serialize PM004
        let r = st.operate("PM004", PointPosition::Reverse).unwrap();
        assert_eq!(r.transition_ms, 3000);
        st.complete("PM004", PointPosition::Reverse).unwrap();
        st.complete("PM001", PointPosition::Reverse).unwrap();
        assert_eq!(st.find_point_machine("PM001").unwrap().connected_track(), "T5S1");
        assert_eq!(st.find_point_machine("PM004").unwrap().connected_track(), "T6S1");
    }

    #[test]
    fn occupancy_transition_drops_protecting_signals() {
        let mut st = demo_station();
        st.set_aspect("HM001", Aspect::Green).unwrap();

        st.set_occupied("T1S5", true, Some("TR204".to_string())).unwrap();
        let affected = st.track_occupancy_changed("T1S5", false, true);
        assert_eq!(affected, vec!["HM001".to_string()]);
        assert_eq!(st.find_signal("HM001").unwrap().current_aspect, Aspect::Red);

        // clearing the track does not touch any signal
        st.set_occupied("T1S5", false, None).unwrap();
        assert!(st.track_occupancy_changed("T1S5", true, false).is_empty());
        assert_eq!(st.find_signal("HM001").unwrap().current_aspect, Aspect::Red);
    }

    #[test]
    fn occupancy_transition_ignores_signals_already_at_stop() {
        let mut st = demo_station();
        st.set_occupied("T1S5", true, None).unwrap();
        // HM001 protects T1S5 but is already at RED
        assert!(st.track_occupancy_changed("T1S5", false, true).is_empty());
    }
}
