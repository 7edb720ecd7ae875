/*!
Screens drawn by the panel application.

- `demo` - static test screen touching every drawing command
- `clock` - live clock plus an animated progress bar, redrawn from two
  threads sharing one session until shutdown
*/

use chrono::Local;
use crossbeam_channel::{select, tick, Receiver};
use dwin_protocol::protocol::WIDTH;
use dwin_protocol::{
    font, palette, AreaMoveMode, Channel, Direction, NumberStyle, Rect, RectMode, Result, Session,
    TextStyle,
};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::PanelConfig;

const TITLE_HEIGHT: i32 = 30;
const BAR: Rect = Rect { x1: 20, y1: 400, x2: 251, y2: 420 };

/// Left edge that centres `chars` glyphs of font `size`
fn centered_x(chars: usize, size: u8) -> i32 {
    let width = chars as i32 * font::glyph_width(size);
    ((WIDTH - width) / 2).max(0)
}

fn title_bar<C: Channel>(session: &Session<C>, title: &str) -> Result<()> {
    session.draw_rectangle(RectMode::Fill, palette::BG_BLUE, Rect::new(0, 0, 271, TITLE_HEIGHT))?;
    let style = TextStyle::new(font::HEADER, palette::WHITE, palette::BG_BLUE);
    session.draw_string(&style, 14, 5, title)
}

/// Draw the test screen
pub fn demo<C: Channel>(session: &Session<C>, panel: &PanelConfig) -> Result<()> {
    info!("🧪 Drawing demo screen");
    session.set_backlight(panel.backlight)?;
    session.clear(palette::BG_BLACK)?;
    title_bar(session, "DWIN T5UIC1")?;

    // Rectangles in each mode
    session.draw_rectangle(RectMode::Outline, palette::RECTANGLE, Rect::new(10, 45, 130, 95))?;
    session.draw_rectangle(RectMode::Fill, palette::BAR_FILL, Rect::new(142, 45, 262, 95))?;
    session.draw_rectangle(RectMode::XorFill, palette::SELECT, Rect::new(100, 60, 172, 80))?;
    session.draw_line(palette::LINE, 0, 105, 271, 105)?;

    // Text and numbers
    let label = TextStyle::new(font::MENU, palette::POPUP_TEXT, palette::BG_BLACK);
    let number = NumberStyle::new(font::MENU, palette::PERCENT, palette::BG_BLACK);
    session.draw_string(&label, 10, 115, "Nozzle")?;
    session.draw_int_value(&number, 3, 120, 115, 215)?;
    session.draw_string(&label, 10, 140, "Z offset")?;
    session.draw_signed_float(font::MENU, palette::BG_BLACK, 1, 2, 126, 140, -0.15)?;
    session.draw_string(&label, 10, 165, "Flow")?;
    session.draw_float_value(&number, 3, 1, 120, 165, 98.5)?;

    // Circles
    session.draw_circle(palette::YELLOW, 68, 250, 40)?;
    session.fill_circle(palette::BG_RED, 204, 250, 30)?;

    session.qr_code(3, 80, 310, "https://github.com/")?;

    // Nudge the split line down to show area moves work
    session.area_move(
        AreaMoveMode::Translate,
        Direction::Down,
        2,
        palette::BG_BLACK,
        Rect::new(0, 100, 271, 110),
    )?;

    session.refresh()
}

/// Run the clock screen until `shutdown` disconnects.
///
/// The clock and the progress bar redraw from separate threads; the session
/// lock keeps their frames whole. Draw failures are logged and the next tick
/// tries again.
pub fn clock<C: Channel>(session: &Session<C>, panel: &PanelConfig, shutdown: Receiver<()>) -> Result<()> {
    info!("🕒 Starting clock screen");
    session.set_backlight(panel.backlight)?;
    session.clear(palette::BG_BLACK)?;
    title_bar(session, "Clock")?;
    session.draw_rectangle(RectMode::Outline, palette::WHITE, BAR)?;
    session.refresh()?;

    let clock_interval = Duration::from_millis(panel.clock_interval_ms.max(1));
    let progress_interval = Duration::from_millis(panel.progress_interval_ms.max(1));

    thread::scope(|scope| {
        let clock_shutdown = shutdown.clone();
        scope.spawn(move || run_clock(session, clock_interval, clock_shutdown));
        scope.spawn(move || run_progress(session, progress_interval, shutdown));
    });

    info!("🛑 Clock screen stopped");
    Ok(())
}

fn run_clock<C: Channel>(session: &Session<C>, interval: Duration, shutdown: Receiver<()>) {
    let ticker = tick(interval);
    let time_style = TextStyle::new(font::F20X40, palette::WHITE, palette::BG_BLACK);
    let date_style = TextStyle::new(font::F10X20, palette::POPUP_TEXT, palette::BG_BLACK);

    loop {
        let now = Local::now();
        let time = now.format("%H:%M:%S").to_string();
        let date = now.format("%Y-%m-%d").to_string();

        let drawn = session
            .draw_string(&time_style, centered_x(time.len(), font::F20X40), 180, &time)
            .and_then(|_| session.draw_string(&date_style, centered_x(date.len(), font::F10X20), 240, &date))
            .and_then(|_| session.refresh());
        if let Err(e) = drawn {
            warn!("Clock redraw failed: {}", e);
        }

        select! {
            recv(ticker) -> _ => {}
            recv(shutdown) -> _ => break,
        }
    }
}

fn run_progress<C: Channel>(session: &Session<C>, interval: Duration, shutdown: Receiver<()>) {
    let ticker = tick(interval);
    let number = NumberStyle::new(font::MENU, palette::PERCENT, palette::BG_BLACK);
    let inner_width = BAR.x2 - BAR.x1 - 2;
    let mut percent: i64 = 0;

    loop {
        // Percent 0 wipes the bar before it fills up again.
        let (color, right) = match percent {
            0 => (palette::BG_BLACK, BAR.x2 - 1),
            p => (palette::BAR_FILL, BAR.x1 + 1 + (inner_width * p as i32) / 100),
        };
        let drawn = session
            .draw_rectangle(RectMode::Fill, color, Rect::new(BAR.x1 + 1, BAR.y1 + 1, right, BAR.y2 - 1))
            .and_then(|_| session.draw_int_value(&number, 3, 112, BAR.y2 + 8, percent));
        if let Err(e) = drawn {
            warn!("Progress redraw failed: {}", e);
        }

        percent = (percent + 5) % 105;

        select! {
            recv(ticker) -> _ => {}
            recv(shutdown) -> _ => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use dwin_protocol::session::wire_frame;
    use dwin_protocol::{MemoryChannel, SessionConfig};

    fn session() -> (Session<MemoryChannel>, MemoryChannel) {
        let config = SessionConfig {
            post_send_delay_ms: 0,
            ..SessionConfig::default()
        };
        let request = wire_frame(&[0x00], config.frame_header);
        let wire = MemoryChannel::new().with_reply(&request, &[0xAA, 0x00, b'O', b'K']);
        let session = Session::connect(wire.clone(), config).unwrap();
        wire.clear_written();
        (session, wire)
    }

    #[test]
    fn test_centered_x() {
        assert_eq!(centered_x(8, font::F20X40), 56);
        assert_eq!(centered_x(100, font::F32X64), 0);
        assert_eq!(centered_x(0, font::F6X12), WIDTH / 2);
    }

    #[test]
    fn test_demo_draws_and_refreshes() {
        let (session, wire) = session();
        demo(&session, &PanelConfig::default()).unwrap();

        let writes = wire.writes();
        assert!(writes.len() > 100);
        assert_eq!(writes.last().unwrap(), &wire_frame(&[0x3D], true));
    }

    #[test]
    fn test_clock_stops_on_shutdown() {
        let (session, wire) = session();
        let (tx, rx) = bounded::<()>(0);
        let panel = PanelConfig {
            clock_interval_ms: 5,
            progress_interval_ms: 5,
            ..PanelConfig::default()
        };

        thread::scope(|scope| {
            let handle = scope.spawn(|| clock(&session, &panel, rx));
            thread::sleep(Duration::from_millis(50));
            drop(tx);
            handle.join().unwrap().unwrap();
        });

        let wire = wire.written();
        assert!(wire.ends_with(&[0xCC, 0x33, 0xC3, 0x3C]));
    }
}
