use log::*;
use crate::model::*;
use crate::topology::Station;
use crate::interlocking::{InterlockingError, EntityKind};

/// Display color for an aspect name coming from a UI. Unrecognized input
/// falls back to the stop color; a signal lamp must never render blank.
pub fn aspect_color(name :&str) -> &'static str {
    Aspect::parse(name).unwrap_or(Aspect::Red).color()
}

impl Station {
    /// Advisory predicate: would setting `new_aspect` on this signal be
    /// legal? True iff the signal exists and the aspect is a member of
    /// its aspect set. Side-effect-free so callers can check-then-act,
    /// and so a UI can grey out illegal aspect buttons with the same
    /// test the commit path uses.
    pub fn is_valid_aspect_change(&self, signal_id :&str, new_aspect :Aspect) -> bool {
        self.signals.get(signal_id).map(|s| s.allows(new_aspect)).unwrap_or(false)
    }

    /// Commit path for main aspects. Stop is always reachable; a proceed
    /// aspect additionally requires every protected track clear and no
    /// interlocked signal already showing proceed.
    pub fn set_aspect(&mut self, signal_id :&str, new_aspect :Aspect)
            -> Result<(), InterlockingError> {
        let s = self.signals.get(signal_id)
            .ok_or_else(|| InterlockingError::NotFound(
                EntityKind::Signal, signal_id.to_string()))?;

        if !s.allows(new_aspect) {
            warn!("aspect {} refused on {}: not in its aspect set",
                  new_aspect.as_str(), signal_id);
            return Err(InterlockingError::InvalidAspect {
                signal: signal_id.to_string(), aspect: new_aspect });
        }

        if new_aspect.is_proceed() {
            let occupied :Vec<String> = s.protected_tracks.iter()
                .filter(|t| self.tracks.get(t.as_str()).map(|t| t.occupied).unwrap_or(true))
                .cloned()
                .collect();
            if !occupied.is_empty() {
                warn!("aspect {} refused on {}: protected tracks occupied: {}",
                      new_aspect.as_str(), signal_id, occupied.join(", "));
                return Err(InterlockingError::SafetyInterlockViolation {
                    id: signal_id.to_string(), occupied });
            }

            for other_id in &s.interlocked_with {
                if let Some(other) = self.signals.get(other_id) {
                    if other.current_aspect.is_proceed() {
                        warn!("aspect {} refused on {}: interlocked signal {} shows {}",
                              new_aspect.as_str(), signal_id, other_id,
                              other.current_aspect.as_str());
                        return Err(InterlockingError::InterlockedSignalConflict {
                            signal: signal_id.to_string(),
                            other: other_id.clone(),
                            aspect: other.current_aspect });
                    }
                }
            }
        }

        let s = self.signals.get_mut(signal_id)
            .ok_or_else(|| InterlockingError::NotFound(
                EntityKind::Signal, signal_id.to_string()))?;
        info!("signal {}: {} -> {}", signal_id,
              s.current_aspect.as_str(), new_aspect.as_str());
        s.current_aspect = new_aspect;
        Ok(())
    }

    pub fn set_calling_on(&mut self, signal_id :&str, sub :SubsidiaryAspect)
            -> Result<(), InterlockingError> {
        let s = self.home_signal_mut(signal_id)?;
        s.calling_on = Some(sub);
        debug!("signal {}: calling-on {:?}", signal_id, sub);
        Ok(())
    }

    pub fn set_loop_aspect(&mut self, signal_id :&str, sub :SubsidiaryAspect)
            -> Result<(), InterlockingError> {
        let s = self.home_signal_mut(signal_id)?;
        s.loop_aspect = Some(sub);
        debug!("signal {}: loop aspect {:?}", signal_id, sub);
        Ok(())
    }

    fn home_signal_mut(&mut self, signal_id :&str) -> Result<&mut Signal, InterlockingError> {
        let s = self.signals.get_mut(signal_id)
            .ok_or_else(|| InterlockingError::NotFound(
                EntityKind::Signal, signal_id.to_string()))?;
        if s.kind != SignalKind::Home {
            return Err(InterlockingError::NotHomeSignal(signal_id.to_string()));
        }
        Ok(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::demo_station;

    #[test]
    fn membership_is_the_validity_predicate() {
        let st = demo_station();
        // four-aspect outer signal
        assert!(st.is_valid_aspect_change("OT001", Aspect::Green));
        assert!(st.is_valid_aspect_change("OT001", Aspect::DoubleYellow));
        assert!(!st.is_valid_aspect_change("OT001", Aspect::Yellow));
        // two-aspect starter, RED/YELLOW
        assert!(st.is_valid_aspect_change("ST001", Aspect::Yellow));
        assert!(!st.is_valid_aspect_change("ST001", Aspect::Green));
        // unknown signal is never valid
        assert!(!st.is_valid_aspect_change("SG999", Aspect::Red));
    }

    #[test]
    fn every_possible_aspect_validates_and_no_other() {
        let st = demo_station();
        let all = [Aspect::Red, Aspect::Yellow, Aspect::SingleYellow,
                   Aspect::DoubleYellow, Aspect::Green];
        for s in st.signals() {
            for a in &all {
                assert_eq!(st.is_valid_aspect_change(&s.id, *a),
                           s.possible_aspects.contains(a),
                           "signal {} aspect {:?}", s.id, a);
            }
        }
    }

    #[test]
    fn validation_does_not_mutate() {
        let st = demo_station();
        assert!(st.is_valid_aspect_change("OT001", Aspect::Green));
        assert_eq!(st.find_signal("OT001").unwrap().current_aspect, Aspect::Red);
    }

    #[test]
    fn set_aspect_commits_a_member_aspect() {
        let mut st = demo_station();
        st.set_aspect("OT001", Aspect::DoubleYellow).unwrap();
        assert_eq!(st.find_signal("OT001").unwrap().current_aspect, Aspect::DoubleYellow);

        match st.set_aspect("ST001", Aspect::Green) {
            Err(InterlockingError::InvalidAspect { signal, aspect }) => {
                assert_eq!(signal, "ST001");
                assert_eq!(aspect, Aspect::Green);
            },
            other => panic!("expected InvalidAspect, got {:?}", other),
        }
        assert_eq!(st.find_signal("ST001").unwrap().current_aspect, Aspect::Red);
    }

    #[test]
    fn proceed_needs_protected_tracks_clear_but_stop_never_does() {
        let mut st = demo_station();
        st.set_occupied("T1S5", true, Some("TR204".to_string())).unwrap();

        match st.set_aspect("HM001", Aspect::Green) {
            Err(InterlockingError::SafetyInterlockViolation { id, occupied }) => {
                assert_eq!(id, "HM001");
                assert_eq!(occupied, vec!["T1S5".to_string()]);
            },
            other => panic!("expected SafetyInterlockViolation, got {:?}", other),
        }

        // emergency stop is always available
        st.set_aspect("HM001", Aspect::Red).unwrap();

        st.set_occupied("T1S5", false, None).unwrap();
        st.set_aspect("HM001", Aspect::Green).unwrap();
        assert_eq!(st.find_signal("HM001").unwrap().current_aspect, Aspect::Green);
    }

    #[test]
    fn interlocked_signals_cannot_both_show_proceed() {
        let mut st = demo_station();
        st.set_aspect("HM001", Aspect::Green).unwrap();

        match st.set_aspect("HM002", Aspect::Yellow) {
            Err(InterlockingError::InterlockedSignalConflict { signal, other, aspect }) => {
                assert_eq!(signal, "HM002");
                assert_eq!(other, "HM001");
                assert_eq!(aspect, Aspect::Green);
            },
            other => panic!("expected InterlockedSignalConflict, got {:?}", other),
        }

        // dropping the first back to stop releases the second
        st.set_aspect("HM001", Aspect::Red).unwrap();
        st.set_aspect("HM002", Aspect::Yellow).unwrap();
    }

    #[test]
    fn subsidiary_aspects_are_home_only() {
        let mut st = demo_station();
        st.set_calling_on("HM001", SubsidiaryAspect::On).unwrap();
        st.set_loop_aspect("HM001", SubsidiaryAspect::On).unwrap();
        let s = st.find_signal("HM001").unwrap();
        assert_eq!(s.calling_on, Some(SubsidiaryAspect::On));
        assert_eq!(s.loop_aspect, Some(SubsidiaryAspect::On));

        match st.set_calling_on("ST001", SubsidiaryAspect::On) {
            Err(InterlockingError::NotHomeSignal(id)) => assert_eq!(id, "ST001"),
            other => panic!("expected NotHomeSignal, got {:?}", other),
        }
        assert!(st.set_loop_aspect("OT001", SubsidiaryAspect::On).is_err());
    }

    #[test]
    fn aspect_color_falls_back_to_stop() {
        assert_eq!(aspect_color("GREEN"), Aspect::Green.color());
        assert_eq!(aspect_color("DOUBLE_YELLOW"), Aspect::DoubleYellow.color());
        assert_eq!(aspect_color("FLASHING_MAUVE"), Aspect::Red.color());
        assert_eq!(aspect_color(""), Aspect::Red.color());
    }
}
