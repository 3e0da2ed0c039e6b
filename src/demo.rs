//! Built-in demo layout: a double-junction station yard with two main
//! lines, a loop line, and crossovers between them. Used by the console
//! binary when no station file is given, and as the fixture for tests.

use crate::model::*;
use crate::topology::Station;

fn seg(id :&str, r1 :f32, c1 :f32, r2 :f32, c2 :f32) -> TrackSegment {
    TrackSegment {
        id: id.to_string(),
        start: Pt::new(r1, c1),
        end: Pt::new(r2, c2),
        occupied: false,
        occupied_by: None,
    }
}

fn conn(track :&str, end :TrackEnd) -> TrackConnection {
    TrackConnection { track: track.to_string(), end }
}

fn machine(id :&str, name :&str, junction :Pt,
           root :TrackConnection, normal :TrackConnection,
           reverse :TrackConnection) -> PointMachine {
    PointMachine {
        id: id.to_string(),
        name: name.to_string(),
        junction,
        root, normal, reverse,
        position: PointPosition::Normal,
        status: OperatingStatus::Connected,
        pending: None,
        transition_ms: DEFAULT_TRANSITION_MS,
    }
}

fn signal(id :&str, name :&str, kind :SignalKind, direction :Direction,
          pos :Pt, location :&str, aspects :Vec<Aspect>) -> Signal {
    let home = kind == SignalKind::Home;
    Signal {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        direction,
        pos,
        location: location.to_string(),
        possible_aspects: aspects,
        current_aspect: Aspect::Red,
        calling_on: if home { Some(SubsidiaryAspect::Off) } else { None },
        loop_aspect: if home { Some(SubsidiaryAspect::Off) } else { None },
        protected_tracks: Vec::new(),
        interlocked_with: Vec::new(),
    }
}

pub fn demo_station() -> Station {
    let mut st = Station::empty();

    // T1: lower main line
    st.add_track(seg("T1S1", 60.0, 0.0, 60.0, 10.0));
    st.add_track(seg("T1S2", 60.0, 10.0, 60.0, 30.0));
    st.add_track(seg("T1S3", 60.0, 30.0, 60.0, 50.0));
    st.add_track(seg("T1S4", 60.0, 50.0, 60.0, 100.0));
    st.add_track(seg("T1S5", 60.0, 100.0, 60.0, 120.0));
    st.add_track(seg("T1S6", 60.0, 120.0, 60.0, 160.0));
    st.add_track(seg("T1S7", 60.0, 160.0, 60.0, 180.0));
    st.add_track(seg("T1S8", 60.0, 180.0, 60.0, 200.0));
    st.add_track(seg("T1S9", 60.0, 200.0, 60.0, 250.0));

    // T2: second main line
    st.add_track(seg("T2S1", 70.0, 0.0, 70.0, 53.0));
    st.add_track(seg("T2S2", 70.0, 53.0, 70.0, 70.0));
    st.add_track(seg("T2S3", 70.0, 70.0, 70.0, 90.0));
    st.add_track(seg("T2S4", 70.0, 90.0, 70.0, 119.0));
    st.add_track(seg("T2S5", 70.0, 119.0, 70.0, 163.0));
    st.add_track(seg("T2S6", 70.0, 163.0, 70.0, 182.0));
    st.add_track(seg("T2S7", 70.0, 182.0, 70.0, 200.0));
    st.add_track(seg("T2S8", 70.0, 200.0, 70.0, 250.0));

    // T3: junction ramp between the mains
    st.add_track(seg("T3S1", 70.0, 95.0, 65.0, 100.0));
    st.add_track(seg("T3S2", 65.0, 100.0, 60.0, 105.0));

    // T4: upper loop line
    st.add_track(seg("T4S1", 40.0, 100.0, 40.0, 110.0));
    st.add_track(seg("T4S2", 40.0, 110.0, 40.0, 135.0));
    st.add_track(seg("T4S3", 40.0, 135.0, 40.0, 150.0));
    st.add_track(seg("T4S4", 40.0, 150.0, 40.0, 180.0));

    // crossovers between T1 and T4
    st.add_track(seg("T5S1", 60.0, 110.0, 40.0, 130.0));
    st.add_track(seg("T6S1", 40.0, 170.0, 60.0, 190.0));

    // T7: lower yard line with its own crossovers
    st.add_track(seg("T7S1", 90.0, 110.0, 90.0, 130.0));
    st.add_track(seg("T7S2", 90.0, 130.0, 90.0, 140.0));
    st.add_track(seg("T7S3", 90.0, 140.0, 90.0, 180.0));
    st.add_track(seg("T8S1", 70.0, 100.0, 90.0, 120.0));
    st.add_track(seg("T9S1", 90.0, 170.0, 70.0, 190.0));

    st.add_point_machine(machine("PM001", "Junction A", Pt::new(60.0, 105.0),
        conn("T1S4", TrackEnd::End),
        conn("T1S5", TrackEnd::Start),
        conn("T5S1", TrackEnd::Start)));
    st.add_point_machine(machine("PM002", "Junction B", Pt::new(40.0, 110.0),
        conn("T4S2", TrackEnd::Start),
        conn("T4S1", TrackEnd::End),
        conn("T5S1", TrackEnd::End)));
    st.add_point_machine(machine("PM003", "Junction C", Pt::new(40.0, 160.0),
        conn("T4S3", TrackEnd::End),
        conn("T4S4", TrackEnd::Start),
        conn("T6S1", TrackEnd::Start)));
    st.add_point_machine(machine("PM004", "Junction D", Pt::new(60.0, 195.0),
        conn("T1S9", TrackEnd::Start),
        conn("T1S8", TrackEnd::End),
        conn("T6S1", TrackEnd::End)));

    let mut ot001 = signal("OT001", "Outer A1", SignalKind::Outer, Direction::Up,
        Pt::new(57.0, 5.0), "Approach_Block_1",
        vec![Aspect::Red, Aspect::SingleYellow, Aspect::DoubleYellow, Aspect::Green]);
    ot001.protected_tracks = vec!["T1S1".to_string(), "T1S2".to_string()];
    st.add_signal(ot001);

    let mut ot002 = signal("OT002", "Outer A2", SignalKind::Outer, Direction::Down,
        Pt::new(63.0, 245.0), "Approach_Block_2",
        vec![Aspect::Red, Aspect::SingleYellow, Aspect::DoubleYellow, Aspect::Green]);
    ot002.protected_tracks = vec!["T1S9".to_string()];
    st.add_signal(ot002);

    let mut hm001 = signal("HM001", "Home A1", SignalKind::Home, Direction::Up,
        Pt::new(57.0, 52.0), "Platform_A_Entry",
        vec![Aspect::Red, Aspect::Yellow, Aspect::Green]);
    hm001.protected_tracks = vec!["T1S5".to_string(), "T1S6".to_string()];
    hm001.interlocked_with = vec!["HM002".to_string()];
    st.add_signal(hm001);

    let mut hm002 = signal("HM002", "Home A2", SignalKind::Home, Direction::Down,
        Pt::new(63.0, 198.0), "Platform_A_Exit",
        vec![Aspect::Red, Aspect::Yellow, Aspect::Green]);
    hm002.protected_tracks = vec!["T1S7".to_string(), "T1S8".to_string()];
    hm002.interlocked_with = vec!["HM001".to_string()];
    st.add_signal(hm002);

    st.add_signal(signal("ST001", "Starter A1", SignalKind::Starter, Direction::Up,
        Pt::new(37.0, 112.0), "Loop_Departure",
        vec![Aspect::Red, Aspect::Yellow]));
    st.add_signal(signal("ST002", "Starter A2", SignalKind::Starter, Direction::Up,
        Pt::new(57.0, 122.0), "Platform_A_Main_Departure",
        vec![Aspect::Red, Aspect::Yellow, Aspect::Green]));
    st.add_signal(signal("ST003", "Starter B1", SignalKind::Starter, Direction::Down,
        Pt::new(37.0, 152.0), "Junction_Loop_Entry",
        vec![Aspect::Red, Aspect::Yellow]));
    st.add_signal(signal("ST004", "Starter B2", SignalKind::Starter, Direction::Down,
        Pt::new(67.0, 65.0), "Platform_B_Departure",
        vec![Aspect::Red, Aspect::Yellow, Aspect::Green]));

    st.add_signal(signal("AS001", "Advanced Starter A1", SignalKind::AdvancedStarter,
        Direction::Up, Pt::new(57.0, 205.0), "Advanced_Departure_A",
        vec![Aspect::Red, Aspect::Green]));
    st.add_signal(signal("AS002", "Advanced Starter A2", SignalKind::AdvancedStarter,
        Direction::Down, Pt::new(63.0, 28.0), "Advanced_Departure_B",
        vec![Aspect::Red, Aspect::Green]));

    st.add_level_crossing(LevelCrossing {
        id: "LC001".to_string(),
        name: "LC_GATE1".to_string(),
        pos: Pt::new(37.0, 36.0),
        state: GateState::Open,
    });
    st.add_level_crossing(LevelCrossing {
        id: "LC002".to_string(),
        name: "LC_GATE2".to_string(),
        pos: Pt::new(37.0, 211.0),
        state: GateState::Open,
    });

    st
}
