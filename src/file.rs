use std::fs::File;
use log::*;
use crate::topology::Station;

pub fn load(filename :&str) -> Result<Station, std::io::Error> {
    let station :Station = serde_json::from_reader(File::open(&filename)?)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let issues = station.validate();
    if !issues.is_empty() {
        return Err(std::io::Error::new(std::io::ErrorKind::InvalidData,
            format!("station layout {:?} failed validation with {} issues", filename, issues.len())));
    }
    info!("Loaded station layout from {:?}: {} tracks, {} point machines, {} signals.",
          filename, station.tracks.len(), station.machines.len(), station.signals.len());
    Ok(station)
}

pub fn save(filename :&str, station :&Station) -> Result<(), std::io::Error> {
    info!("Will save station layout to file name {:?}", filename);
    serde_json::to_writer_pretty(&File::create(filename)?, station)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    Ok(())
}
