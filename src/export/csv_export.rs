use std::{
    fmt::Display,
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
    str::FromStr,
};

use chrono::{DateTime, SecondsFormat, Utc};
use log::info;

use super::ExportError;
use crate::session::{FrameCount, Sighting};

pub const COUNTS_HEADER: &str = "frame_index,region_count";
pub const SIGHTINGS_HEADER: &str = "frame_index,x,y,area,detected_at";

fn write_rows<T>(
    path: &Path,
    header: &str,
    rows: &[T],
    write_row: impl Fn(&mut BufWriter<File>, &T) -> std::io::Result<()>,
) -> Result<(), ExportError> {
    let write_all = || -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "{header}")?;
        for row in rows {
            write_row(&mut writer, row)?;
        }
        writer.flush()
    };

    write_all().map_err(|e| ExportError::io(path, e))
}

// The first line must be exactly `header`, and every other non-blank line must have as many
// fields as the header. Row errors are reported with their 1-based line number.
fn read_rows<T>(
    path: &Path,
    header: &str,
    mut parse_row: impl FnMut(&[&str]) -> Result<T, String>,
) -> Result<Vec<T>, ExportError> {
    let file = File::open(path).map_err(|e| ExportError::io(path, e))?;
    let num_fields = header.split(',').count();

    let parse_err = |line: usize, msg: String| ExportError::Parse {
        path: path.to_path_buf(),
        line,
        msg,
    };

    let mut ret = vec![];
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| ExportError::io(path, e))?;
        let line = line.trim();

        if line_no == 1 {
            if line != header {
                return Err(parse_err(
                    line_no,
                    format!("expected header \"{header}\", found \"{line}\""),
                ));
            }
            continue;
        }

        if line.is_empty() {
            continue;
        }

        let fields = line.split(',').map(str::trim).collect::<Vec<_>>();
        if fields.len() != num_fields {
            return Err(parse_err(
                line_no,
                format!("expected {num_fields} fields in \"{line}\""),
            ));
        }

        ret.push(parse_row(&fields).map_err(|msg| parse_err(line_no, msg))?);
    }

    Ok(ret)
}

fn parse_field<T>(name: &str, text: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    text.parse::<T>()
        .map_err(|e| format!("bad {name} \"{text}\": {e}"))
}

/// Write one `frame_index,region_count` row per record, replacing any existing file.
pub fn export_csv(records: &[FrameCount], path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    write_rows(path, COUNTS_HEADER, records, |w, rec| {
        writeln!(w, "{},{}", rec.frame_index, rec.region_count)
    })?;

    info!(
        "Saved {} frame counts to {}",
        records.len(),
        path.display()
    );
    Ok(())
}

/// Write one `frame_index,x,y,area,detected_at` row per sighting, replacing any existing
/// file. Positions are rounded to two decimal places and times are RFC 3339 in UTC.
pub fn export_sightings_csv(
    sightings: &[Sighting],
    path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    write_rows(path, SIGHTINGS_HEADER, sightings, |w, s| {
        writeln!(
            w,
            "{},{:.2},{:.2},{},{}",
            s.frame_index,
            s.x,
            s.y,
            s.area,
            s.detected_at.to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    })?;

    info!("Saved {} sightings to {}", sightings.len(), path.display());
    Ok(())
}

/// Read counts back from a file written by [`export_csv`]. Blank lines are ignored, and
/// frame indices must strictly increase.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<FrameCount>, ExportError> {
    let mut last_index: Option<u64> = None;

    read_rows(path.as_ref(), COUNTS_HEADER, |fields| {
        let frame_index = parse_field::<u64>("frame index", fields[0])?;
        let region_count = parse_field::<u32>("region count", fields[1])?;

        if let Some(prev) = last_index.filter(|&prev| frame_index <= prev) {
            return Err(format!("frame index {frame_index} does not follow {prev}"));
        }
        last_index = Some(frame_index);

        Ok(FrameCount::new(frame_index, region_count))
    })
}

/// Read sightings back from a file written by [`export_sightings_csv`]. Blank lines are
/// ignored, and frame indices must not decrease.
pub fn load_sightings_csv(path: impl AsRef<Path>) -> Result<Vec<Sighting>, ExportError> {
    let mut last_index: Option<u64> = None;

    read_rows(path.as_ref(), SIGHTINGS_HEADER, |fields| {
        let frame_index = parse_field::<u64>("frame index", fields[0])?;
        let x = parse_field::<f64>("x", fields[1])?;
        let y = parse_field::<f64>("y", fields[2])?;
        let area = parse_field::<u32>("area", fields[3])?;
        let detected_at = DateTime::parse_from_rfc3339(fields[4])
            .map_err(|e| format!("bad detection time \"{}\": {e}", fields[4]))?
            .with_timezone(&Utc);

        if let Some(prev) = last_index.filter(|&prev| frame_index < prev) {
            return Err(format!("frame index {frame_index} listed after {prev}"));
        }
        last_index = Some(frame_index);

        Ok(Sighting {
            frame_index,
            x,
            y,
            area,
            detected_at,
        })
    })
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;
    use rand::prelude::*;

    use super::*;

    fn seen_at(secs: u32, millis: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 22, 15, secs).unwrap()
            + chrono::Duration::milliseconds(i64::from(millis))
    }

    #[test]
    fn test_export_then_load() {
        let mut rng = StdRng::seed_from_u64(7);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.csv");

        let mut frame_index = 0;
        let records = (0..500)
            .map(|_| {
                frame_index += rng.gen_range(1..4);
                FrameCount::new(frame_index, rng.gen_range(0..40))
            })
            .collect::<Vec<_>>();

        export_csv(&records, &path).unwrap();
        assert_eq!(load_csv(&path).unwrap(), records);
    }

    #[test]
    fn test_export_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.csv");

        export_csv(&[FrameCount::new(1, 1), FrameCount::new(2, 2)], &path).unwrap();
        export_csv(&[FrameCount::new(1, 5)], &path).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "frame_index,region_count\n1,5\n"
        );
    }

    #[test]
    fn test_empty_export_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.csv");

        export_csv(&[], &path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "frame_index,region_count\n"
        );
        assert_eq!(load_csv(&path).unwrap(), vec![]);
    }

    #[test]
    fn test_full_index_range_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.csv");

        std::fs::write(
            &path,
            format!("frame_index,region_count\n0,1\n{},2\n", u64::MAX),
        )
        .unwrap();
        assert_eq!(
            load_csv(&path).unwrap(),
            vec![FrameCount::new(0, 1), FrameCount::new(u64::MAX, 2)]
        );
    }

    #[test]
    fn test_sightings_export_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("positions.csv");
        let sightings = [
            Sighting {
                frame_index: 3,
                x: 10.5,
                y: 2.0,
                area: 60,
                detected_at: seen_at(0, 250),
            },
            Sighting {
                frame_index: 4,
                x: 1.0 / 3.0,
                y: 7.25,
                area: 51,
                detected_at: seen_at(1, 0),
            },
        ];

        export_sightings_csv(&sightings, &path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "frame_index,x,y,area,detected_at\n\
             3,10.50,2.00,60,2024-03-01T22:15:00.250Z\n\
             4,0.33,7.25,51,2024-03-01T22:15:01.000Z\n"
        );

        let loaded = load_sightings_csv(&path).unwrap();
        assert_eq!(loaded[0], sightings[0]);
        assert_eq!(loaded[1].x, 0.33);
        assert_eq!(loaded[1].detected_at, sightings[1].detected_at);
    }

    #[test]
    fn test_load_bad_sightings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("positions.csv");

        std::fs::write(&path, "frame_index,x,y,area,detected_at\n1,2.00,3.00,50\n").unwrap();
        assert!(matches!(
            load_sightings_csv(&path),
            Err(ExportError::Parse { line: 2, .. })
        ));

        std::fs::write(
            &path,
            "frame_index,x,y,area,detected_at\n1,2.00,3.00,50,last tuesday\n",
        )
        .unwrap();
        assert!(matches!(
            load_sightings_csv(&path),
            Err(ExportError::Parse { line: 2, .. })
        ));

        std::fs::write(
            &path,
            "frame_index,x,y,area,detected_at\n\
             2,2.00,3.00,50,2024-03-01T22:15:00.000Z\n\
             2,4.00,3.00,50,2024-03-01T22:15:00.000Z\n\
             1,2.00,3.00,50,2024-03-01T22:15:00.000Z\n",
        )
        .unwrap();
        assert!(matches!(
            load_sightings_csv(&path),
            Err(ExportError::Parse { line: 4, .. })
        ));
    }

    #[test]
    fn test_load_bad_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.csv");

        std::fs::write(&path, "frame_index,region_count\n1,2\n2,lots\n").unwrap();
        assert!(matches!(
            load_csv(&path),
            Err(ExportError::Parse { line: 3, .. })
        ));

        std::fs::write(&path, "frame_index,region_count\n1\n").unwrap();
        assert!(matches!(
            load_csv(&path),
            Err(ExportError::Parse { line: 2, .. })
        ));

        std::fs::write(&path, "frame,count\n1,2\n").unwrap();
        assert!(matches!(
            load_csv(&path),
            Err(ExportError::Parse { line: 1, .. })
        ));

        std::fs::write(&path, "frame_index,region_count\n4,2\n\n4,3\n").unwrap();
        assert!(matches!(
            load_csv(&path),
            Err(ExportError::Parse { line: 4, .. })
        ));

        std::fs::write(&path, "frame_index,region_count\n-1,2\n").unwrap();
        assert!(matches!(
            load_csv(&path),
            Err(ExportError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_io_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.csv");
        assert!(matches!(load_csv(&missing), Err(ExportError::Io { .. })));
        assert!(matches!(
            load_sightings_csv(&missing),
            Err(ExportError::Io { .. })
        ));

        let unwritable = dir.path().join("no_such_dir").join("counts.csv");
        assert!(matches!(
            export_csv(&[FrameCount::new(1, 1)], &unwritable),
            Err(ExportError::Io { .. })
        ));
    }
}
