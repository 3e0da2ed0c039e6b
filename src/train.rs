//! Scripted occupancy driver: walks a train along an ordered list of
//! track segments, playing the role of the external detection feed. One
//! step occupies the segment entered and clears the one left behind,
//! reporting any signals the occupancy transition forced to stop.

use serde::{Serialize,Deserialize};
use log::*;
use crate::topology::Station;
use crate::interlocking::{InterlockingError, EntityKind};

#[derive(Clone)]
#[derive(Debug)]
#[derive(Serialize,Deserialize)]
pub struct Train {
    pub id :String,
    pub route :Vec<String>,
    pub at :Option<usize>,
}

impl Train {
    pub fn new(id :&str, route :Vec<String>) -> Train {
        Train { id: id.to_string(), route, at: None }
    }

    /// The segment the train currently occupies, if it has entered its
    /// route yet.
    pub fn current(&self) -> Option<&str> {
        self.at.map(|i| self.route[i].as_str())
    }

    /// Advance one segment, wrapping at the end of the route. Returns the
    /// signals forced to stop by the newly occupied segment.
    pub fn step(&mut self, station :&mut Station) -> Result<Vec<String>, InterlockingError> {
        if self.route.is_empty() {
            return Err(InterlockingError::NotFound(
                EntityKind::Track, format!("(empty route for {})", self.id)));
        }

        let next = match self.at {
            Some(i) => {
                let leaving = self.route[i].clone();
                station.set_occupied(&leaving, false, None)?;
                station.track_occupancy_changed(&leaving, true, false);
                (i + 1) % self.route.len()
            },
            None => 0,
        };

        let entering = self.route[next].clone();
        station.set_occupied(&entering, true, Some(self.id.clone()))?;
        let affected = station.track_occupancy_changed(&entering, false, true);
        self.at = Some(next);
        debug!("train {} now on {}", self.id, entering);
        Ok(affected)
    }
}
