use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

use crate::pose::PoseSample;

pub const FILE_PREFIX: &str = "MotionCapture";

/// `MotionCapture_<DD>.<MM>.<YYYY>_<HH>.<MM>.txt` for the given local time.
pub fn capture_file_name<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}{}", FILE_PREFIX, time.format("_%d.%m.%Y_%H.%M.txt"))
}

/// Plain-text capture log: a header line with the controller count, then
/// `<index> <x_m> <y_m> <z_m> <yaw> <pitch> <roll>` per sample.
pub struct CaptureRecorder<W: Write> {
    out: W,
    samples_written: u64,
}

impl<W: Write> CaptureRecorder<W> {
    pub fn new(mut out: W, controller_count: usize) -> io::Result<Self> {
        writeln!(out, "{}", controller_count)?;
        out.flush()?;
        Ok(Self {
            out,
            samples_written: 0,
        })
    }

    pub fn write_sample(&mut self, sample: &PoseSample) -> io::Result<()> {
        let [x, y, z] = sample.position_m;
        writeln!(
            self.out,
            "{} {:.4} {:.4} {:.4} {:.3} {:.3} {:.3}",
            sample.index, x, y, z, sample.rotation.yaw, sample.rotation.pitch, sample.rotation.roll
        )?;
        self.samples_written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    pub fn into_inner(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

impl CaptureRecorder<BufWriter<File>> {
    pub fn create<Tz: TimeZone>(
        dir: &Path,
        time: &DateTime<Tz>,
        controller_count: usize,
    ) -> io::Result<(Self, PathBuf)>
    where
        Tz::Offset: std::fmt::Display,
    {
        let path = dir.join(capture_file_name(time));
        let file = File::create(&path)?;
        let recorder = Self::new(BufWriter::new(file), controller_count)?;
        Ok((recorder, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Ypr;
    use chrono::{FixedOffset, Utc};

    fn sample(index: usize) -> PoseSample {
        PoseSample {
            index,
            position_m: [0.25, 1.0, -0.5],
            rotation: Ypr::new(-170.0, 12.5, 0.0),
        }
    }

    #[test]
    fn file_name_uses_day_month_year_hour_minute() {
        let time = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 7, 9, 5, 59)
            .unwrap();
        assert_eq!(capture_file_name(&time), "MotionCapture_07.03.2024_09.05.txt");

        let time = Utc.with_ymd_and_hms(1999, 12, 31, 23, 59, 0).unwrap();
        assert_eq!(capture_file_name(&time), "MotionCapture_31.12.1999_23.59.txt");
    }

    #[test]
    fn header_is_controller_count() {
        let recorder = CaptureRecorder::new(Vec::new(), 3).unwrap();
        let out = String::from_utf8(recorder.into_inner().unwrap()).unwrap();
        assert_eq!(out, "3\n");
    }

    #[test]
    fn samples_are_space_separated() {
        let mut recorder = CaptureRecorder::new(Vec::new(), 2).unwrap();
        recorder.write_sample(&sample(0)).unwrap();
        recorder.write_sample(&sample(1)).unwrap();
        assert_eq!(recorder.samples_written(), 2);

        let out = String::from_utf8(recorder.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "2");
        assert_eq!(lines[1], "0 0.2500 1.0000 -0.5000 -170.000 12.500 0.000");
        assert_eq!(lines[2], "1 0.2500 1.0000 -0.5000 -170.000 12.500 0.000");
    }

    #[test]
    fn create_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let time = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let (recorder, path) = CaptureRecorder::create(dir.path(), &time, 4).unwrap();
        drop(recorder.into_inner().unwrap());

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "MotionCapture_02.01.2024_03.04.txt"
        );
        assert_eq!(std::fs::read_to_string(path).unwrap(), "4\n");
    }
}
