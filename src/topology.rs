use std::collections::HashMap;
use serde::{Serialize,Deserialize};
use log::*;
use crate::model::*;
use crate::interlocking::{InterlockingError, EntityKind};

/// The station layout: every registry the interlocking core works
/// against. Built once at startup from load data (a station file or the
/// built-in demo layout) and kept for the process lifetime. The only
/// mutable cells are track occupancy, point machine position/status and
/// signal aspects, each owned by its own operation in the interlocking
/// and signal modules.
#[derive(Clone, Default)]
#[derive(Debug)]
#[derive(Serialize,Deserialize)]
pub struct Station {
    pub tracks :HashMap<String, TrackSegment>,
    pub machines :HashMap<String, PointMachine>,
    pub signals :HashMap<String, Signal>,
    pub crossings :HashMap<String, LevelCrossing>,
}

impl Station {
    pub fn empty() -> Self { Default::default() }

    pub fn add_track(&mut self, t :TrackSegment) {
        self.tracks.insert(t.id.clone(), t);
    }

    pub fn add_point_machine(&mut self, m :PointMachine) {
        self.machines.insert(m.id.clone(), m);
    }

    pub fn add_signal(&mut self, s :Signal) {
        self.signals.insert(s.id.clone(), s);
    }

    pub fn add_level_crossing(&mut self, c :LevelCrossing) {
        self.crossings.insert(c.id.clone(), c);
    }

    // Track registry

    pub fn find_track(&self, id :&str) -> Option<&TrackSegment> {
        self.tracks.get(id)
    }

    pub fn endpoint(&self, track_id :&str, end :TrackEnd) -> Result<Pt, InterlockingError> {
        let t = self.tracks.get(track_id)
            .ok_or_else(|| InterlockingError::NotFound(EntityKind::Track, track_id.to_string()))?;
        Ok(t.endpoint(end))
    }

    /// Write path for the external detection feed. The core itself never
    /// decides occupancy; it only records what the feed reports.
    pub fn set_occupied(&mut self, track_id :&str, occupied :bool,
                        occupied_by :Option<String>) -> Result<(), InterlockingError> {
        let t = self.tracks.get_mut(track_id)
            .ok_or_else(|| InterlockingError::NotFound(EntityKind::Track, track_id.to_string()))?;
        t.occupied = occupied;
        t.occupied_by = if occupied { occupied_by } else { None };
        debug!("track {} occupancy set to {}", track_id, occupied);
        Ok(())
    }

    // Point machine registry

    pub fn find_point_machine(&self, id :&str) -> Option<&PointMachine> {
        self.machines.get(id)
    }

    pub fn point_machines(&self) -> impl Iterator<Item = &PointMachine> {
        self.machines.values()
    }

    /// The machine whose root/normal/reverse connection names `track_id`.
    /// Layouts are expected to give each plain segment at most one
    /// controlling machine; connection tracks strung between two
    /// junctions may match either of them.
    pub fn find_controlling_machine(&self, track_id :&str) -> Option<&PointMachine> {
        self.machines.values().find(|m| {
            m.track_connections().iter().any(|c| c.track == track_id)
        })
    }

    // Signal registry

    pub fn find_signal(&self, id :&str) -> Option<&Signal> {
        self.signals.get(id)
    }

    pub fn signals(&self) -> impl Iterator<Item = &Signal> {
        self.signals.values()
    }

    pub fn signals_of_kind(&self, kind :SignalKind) -> impl Iterator<Item = &Signal> {
        self.signals.values().filter(move |s| s.kind == kind)
    }

    pub fn signals_in_direction(&self, direction :Direction) -> impl Iterator<Item = &Signal> {
        self.signals.values().filter(move |s| s.direction == direction)
    }

    pub fn find_level_crossing(&self, id :&str) -> Option<&LevelCrossing> {
        self.crossings.get(id)
    }

    pub fn level_crossings(&self) -> impl Iterator<Item = &LevelCrossing> {
        self.crossings.values()
    }

    /// Load-time referential integrity: every track reference from point
    /// machines and signals must resolve, and every signal must currently
    /// show a member of its own aspect set. Returns all problems found so
    /// a bad layout file can be reported in one pass.
    pub fn validate(&self) -> Vec<InterlockingError> {
        let mut issues = Vec::new();

        for m in self.machines.values() {
            for c in m.track_connections().iter() {
                if !self.tracks.contains_key(&c.track) {
                    issues.push(InterlockingError::NotFound(
                        EntityKind::Track, format!("{} (referenced by {})", c.track, m.id)));
                }
            }
        }

        for s in self.signals.values() {
            if !s.allows(s.current_aspect) {
                issues.push(InterlockingError::InvalidAspect {
                    signal: s.id.clone(), aspect: s.current_aspect });
            }
            for t in &s.protected_tracks {
                if !self.tracks.contains_key(t) {
                    issues.push(InterlockingError::NotFound(
                        EntityKind::Track, format!("{} (protected by {})", t, s.id)));
                }
            }
            for other in &s.interlocked_with {
                if !self.signals.contains_key(other) {
                    issues.push(InterlockingError::NotFound(
                        EntityKind::Signal, format!("{} (interlocked with {})", other, s.id)));
                }
            }
        }

        for i in &issues {
            warn!("layout issue: {}", i);
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::demo_station;

    #[test]
    fn find_track_and_endpoint() {
        let st = demo_station();
        assert!(st.find_track("T1S4").is_some());
        assert!(st.find_track("T0S0").is_none());
        assert_eq!(st.endpoint("T1S4", TrackEnd::Start).unwrap(), Pt::new(60.0, 50.0));
        assert_eq!(st.endpoint("T1S4", TrackEnd::End).unwrap(), Pt::new(60.0, 100.0));
        match st.endpoint("T0S0", TrackEnd::Start) {
            Err(InterlockingError::NotFound(EntityKind::Track, _)) => {},
            other => panic!("expected track NotFound, got {:?}", other),
        }
    }

    #[test]
    fn controlling_machine_lookup() {
        let st = demo_station();
        assert_eq!(st.find_controlling_machine("T1S4").unwrap().id, "PM001");
        assert_eq!(st.find_controlling_machine("T4S1").unwrap().id, "PM002");
        assert!(st.find_controlling_machine("T2S3").is_none());
    }

    #[test]
    fn connected_track_follows_position() {
        let mut st = demo_station();
        assert_eq!(st.find_point_machine("PM001").unwrap().connected_track(), "T1S5");
        let m = st.machines.get_mut("PM001").unwrap();
        m.position = PointPosition::Reverse;
        assert_eq!(st.find_point_machine("PM001").unwrap().connected_track(), "T5S1");
    }

    #[test]
    fn signal_queries_filter_by_kind_and_direction() {
        let st = demo_station();
        assert_eq!(st.signals_of_kind(SignalKind::Outer).count(), 2);
        assert_eq!(st.signals_of_kind(SignalKind::Starter).count(), 4);
        assert!(st.signals_in_direction(Direction::Up)
            .all(|s| s.direction == Direction::Up));
        assert_eq!(st.signals().count(), 10);
    }

    #[test]
    fn set_occupied_records_the_feed() {
        let mut st = demo_station();
        st.set_occupied("T1S5", true, Some("TR101".to_string())).unwrap();
        let t = st.find_track("T1S5").unwrap();
        assert!(t.occupied);
        assert_eq!(t.occupied_by.as_deref(), Some("TR101"));

        st.set_occupied("T1S5", false, None).unwrap();
        let t = st.find_track("T1S5").unwrap();
        assert!(!t.occupied);
        assert!(t.occupied_by.is_none());

        assert!(st.set_occupied("T0S0", true, None).is_err());
    }

    #[test]
    fn validation_catches_dangling_references() {
        let mut st = demo_station();
        assert!(st.validate().is_empty());

        st.machines.get_mut("PM001").unwrap().reverse.track = "T0S0".to_string();
        let issues = st.validate();
        assert_eq!(issues.len(), 1);
        match &issues[0] {
            InterlockingError::NotFound(EntityKind::Track, what) => {
                assert!(what.contains("T0S0"));
                assert!(what.contains("PM001"));
            },
            other => panic!("expected track NotFound, got {:?}", other),
        }
    }

    #[test]
    fn validation_catches_out_of_set_aspect() {
        let mut st = demo_station();
        // ST001 is a two-aspect starter, RED/YELLOW only
        st.signals.get_mut("ST001").unwrap().current_aspect = Aspect::Green;
        let issues = st.validate();
        assert_eq!(issues.len(), 1);
        match &issues[0] {
            InterlockingError::InvalidAspect { signal, aspect } => {
                assert_eq!(signal, "ST001");
                assert_eq!(*aspect, Aspect::Green);
            },
            other => panic!("expected InvalidAspect, got {:?}", other),
        }
    }
}
