use serde::{Serialize,Deserialize};
use smallvec::SmallVec;
use crate::interlocking::InterlockingError;

/// Grid coordinate used by the layout data. The core stores these for
/// callers (schematics, HMIs) but performs no geometry on them.
#[derive(Copy, Clone, Debug, PartialEq)]
#[derive(Serialize,Deserialize)]
pub struct Pt {
    pub row :f32,
    pub col :f32,
}

impl Pt {
    pub fn new(row :f32, col :f32) -> Pt { Pt { row, col } }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[derive(Serialize,Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackEnd { Start, End }

impl TrackEnd {
    pub fn opposite(&self) -> TrackEnd {
        match self {
            TrackEnd::Start => TrackEnd::End,
            TrackEnd::End => TrackEnd::Start,
        }
    }
}

impl std::str::FromStr for TrackEnd {
    type Err = InterlockingError;
    fn from_str(s :&str) -> Result<TrackEnd, InterlockingError> {
        match s {
            "START" => Ok(TrackEnd::Start),
            "END" => Ok(TrackEnd::End),
            other => Err(InterlockingError::InvalidEndpoint(other.to_string())),
        }
    }
}

/// A fixed piece of track between two grid points. Only the occupancy
/// fields ever change after load; they are written by the detection feed
/// through `Station::set_occupied`.
#[derive(Clone)]
#[derive(Debug)]
#[derive(Serialize,Deserialize)]
pub struct TrackSegment {
    pub id :String,
    pub start :Pt,
    pub end :Pt,
    pub occupied :bool,
    #[serde(default)]
    pub occupied_by :Option<String>,
}

impl TrackSegment {
    pub fn endpoint(&self, end :TrackEnd) -> Pt {
        match end {
            TrackEnd::Start => self.start,
            TrackEnd::End => self.end,
        }
    }
}

/// Names which endpoint of which segment joins a shared junction point.
#[derive(Clone)]
#[derive(Debug)]
#[derive(Serialize,Deserialize)]
pub struct TrackConnection {
    pub track :String,
    pub end :TrackEnd,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[derive(Serialize,Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PointPosition { Normal, Reverse }

impl PointPosition {
    pub fn opposite(&self) -> PointPosition {
        match self {
            PointPosition::Normal => PointPosition::Reverse,
            PointPosition::Reverse => PointPosition::Normal,
        }
    }

    pub fn parse(s :&str) -> Option<PointPosition> {
        match s {
            "NORMAL" => Some(PointPosition::Normal),
            "REVERSE" => Some(PointPosition::Reverse),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PointPosition::Normal => "NORMAL",
            PointPosition::Reverse => "REVERSE",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[derive(Serialize,Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatingStatus { Connected, InTransition }

pub const DEFAULT_TRANSITION_MS :u64 = 3000;

fn default_transition_ms() -> u64 { DEFAULT_TRANSITION_MS }

/// A switch machine bridging a root track and two divergent tracks at a
/// junction point. Topology fields are immutable after load;
/// `position`/`status`/`pending` are owned by the operate/complete
/// protocol in the interlocking module.
#[derive(Clone)]
#[derive(Debug)]
#[derive(Serialize,Deserialize)]
pub struct PointMachine {
    pub id :String,
    pub name :String,
    pub junction :Pt,
    pub root :TrackConnection,
    pub normal :TrackConnection,
    pub reverse :TrackConnection,
    pub position :PointPosition,
    pub status :OperatingStatus,
    #[serde(default)]
    pub pending :Option<PointPosition>,
    #[serde(default = "default_transition_ms")]
    pub transition_ms :u64,
}

impl PointMachine {
    /// All track connections this machine touches. The safety check must
    /// see every one of them clear before a move may begin.
    pub fn track_connections(&self) -> SmallVec<[&TrackConnection; 3]> {
        let mut v = SmallVec::new();
        v.push(&self.root);
        v.push(&self.normal);
        v.push(&self.reverse);
        v
    }

    pub fn branch(&self, position :PointPosition) -> &TrackConnection {
        match position {
            PointPosition::Normal => &self.normal,
            PointPosition::Reverse => &self.reverse,
        }
    }

    /// The branch track currently joined to the root. Pure function of
    /// `position`; during a transition it still reports the old branch.
    pub fn connected_track(&self) -> &str {
        &self.branch(self.position).track
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[derive(Serialize,Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction { Up, Down }

impl Direction {
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    pub fn parse(s :&str) -> Option<Direction> {
        match s {
            "UP" => Some(Direction::Up),
            "DOWN" => Some(Direction::Down),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[derive(Serialize,Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind { Outer, Home, Starter, AdvancedStarter }

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[derive(Serialize,Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Aspect { Red, Yellow, SingleYellow, DoubleYellow, Green }

impl Aspect {
    pub fn parse(s :&str) -> Option<Aspect> {
        match s {
            "RED" => Some(Aspect::Red),
            "YELLOW" => Some(Aspect::Yellow),
            "SINGLE_YELLOW" => Some(Aspect::SingleYellow),
            "DOUBLE_YELLOW" => Some(Aspect::DoubleYellow),
            "GREEN" => Some(Aspect::Green),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Aspect::Red => "RED",
            Aspect::Yellow => "YELLOW",
            Aspect::SingleYellow => "SINGLE_YELLOW",
            Aspect::DoubleYellow => "DOUBLE_YELLOW",
            Aspect::Green => "GREEN",
        }
    }

    /// Anything that is not stop.
    pub fn is_proceed(&self) -> bool {
        !matches!(self, Aspect::Red)
    }

    pub fn color(&self) -> &'static str {
        match self {
            Aspect::Red => "#ff0000",
            Aspect::Yellow | Aspect::SingleYellow => "#ffc800",
            Aspect::DoubleYellow => "#ffc800",
            Aspect::Green => "#00b050",
        }
    }
}

/// Independent sub-state on home signals (calling-on and loop lamps),
/// not governed by the main aspect rule.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[derive(Serialize,Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubsidiaryAspect { Off, On }

#[derive(Clone)]
#[derive(Debug)]
#[derive(Serialize,Deserialize)]
pub struct Signal {
    pub id :String,
    pub name :String,
    pub kind :SignalKind,
    pub direction :Direction,
    pub pos :Pt,
    pub location :String,
    pub possible_aspects :Vec<Aspect>,
    pub current_aspect :Aspect,
    #[serde(default)]
    pub calling_on :Option<SubsidiaryAspect>,
    #[serde(default)]
    pub loop_aspect :Option<SubsidiaryAspect>,
    #[serde(default)]
    pub protected_tracks :Vec<String>,
    #[serde(default)]
    pub interlocked_with :Vec<String>,
}

impl Signal {
    pub fn allows(&self, aspect :Aspect) -> bool {
        self.possible_aspects.contains(&aspect)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[derive(Serialize,Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateState { Open, Closed }

#[derive(Clone)]
#[derive(Debug)]
#[derive(Serialize,Deserialize)]
pub struct LevelCrossing {
    pub id :String,
    pub name :String,
    pub pos :Pt,
    pub state :GateState,
}
