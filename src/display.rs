use std::io::{self, Write};

use crate::pose::PoseSample;

pub const TITLE: &str = "PSMoveService Motion capture";
pub const TITLE_RECORDING: &str = "PSMoveService Motion capture: recording";

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

const HELP: &str = "\n F2 or Cross - record on, F4 or Circle - record off.\n \
                    Numpad 6, 3, 1 - change FPS record.\n\n \
                    F6 or Move - centering. Escape - close.\n";

pub fn status_line(fps: u32, recording: bool) -> String {
    let state = if recording { "on" } else { "off" };
    format!(" Current FPS - {fps}, Recording {state}")
}

pub fn sample_line(sample: &PoseSample) -> String {
    let [x, y, z] = sample.position_m;
    format!(
        " {} {:5.2} {:5.2} {:5.2} {:5.2} {:5.2} {:5.2}",
        sample.index, x, y, z, sample.rotation.yaw, sample.rotation.pitch, sample.rotation.roll
    )
}

/// Redraws the whole console for one frame.
pub fn render_frame<W: Write>(
    out: &mut W,
    fps: u32,
    recording: bool,
    samples: &[PoseSample],
) -> io::Result<()> {
    write!(out, "{CLEAR_SCREEN}")?;
    writeln!(out)?;
    writeln!(out, "{}", status_line(fps, recording))?;
    for sample in samples {
        writeln!(out, "{}", sample_line(sample))?;
    }
    write!(out, "{HELP}")?;
    out.flush()
}

/// Sets the console title. Off Windows the title is an OSC escape written to
/// `out`.
#[cfg(windows)]
pub fn set_console_title<W: Write + ?Sized>(_out: &mut W, recording: bool) -> io::Result<()> {
    use windows::core::HSTRING;
    use windows::Win32::System::Console::SetConsoleTitleW;

    let title = HSTRING::from(if recording { TITLE_RECORDING } else { TITLE });
    // Safety: the HSTRING outlives the call.
    let _ = unsafe { SetConsoleTitleW(&title) };
    Ok(())
}

#[cfg(not(windows))]
pub fn set_console_title<W: Write + ?Sized>(out: &mut W, recording: bool) -> io::Result<()> {
    let title = if recording { TITLE_RECORDING } else { TITLE };
    write!(out, "\x1B]0;{title}\x07")?;
    out.flush()
}
