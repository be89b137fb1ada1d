//! Terminal input plumbing. A reader thread forwards crossterm events over a
//! channel and [`Runner`] interleaves them with a fixed-rate frame tick.

use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent, MouseEventKind};

#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    /// A frame is due: advance clocks and animations.
    Tick,
}

/// Anything that can hand the runner input events.
pub trait EventSource: Send + 'static {
    /// Wait at most `timeout` for the next event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Map a raw crossterm event to what the app reacts to. Pointer motion and
/// focus changes are dropped so they cannot flood the queue.
fn forward(event: CtEvent) -> Option<AppEvent> {
    match event {
        CtEvent::Key(key) => Some(AppEvent::Key(key)),
        CtEvent::Mouse(mouse) if mouse.kind != MouseEventKind::Moved => {
            Some(AppEvent::Mouse(mouse))
        }
        CtEvent::Resize(_, _) => Some(AppEvent::Resize),
        _ => None,
    }
}

/// Reads the terminal on a dedicated thread.
pub struct CrosstermEventSource {
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> io::Result<Self> {
        let (tx, rx) = mpsc::channel();

        thread::Builder::new()
            .name("clikr-input".into())
            .spawn(move || loop {
                let event = match event::read() {
                    Ok(event) => event,
                    Err(err) => {
                        tracing::error!(error = %err, "terminal event stream failed");
                        return;
                    }
                };
                if let Some(event) = forward(event) {
                    if tx.send(event).is_err() {
                        return;
                    }
                }
            })?;

        Ok(Self { rx })
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Events pushed by hand through a channel; used by headless runs.
pub struct ChannelSource {
    rx: Receiver<AppEvent>,
}

impl ChannelSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }

    pub fn pair() -> (Sender<AppEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self::new(rx))
    }
}

impl EventSource for ChannelSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Merges input with a frame tick. A `Tick` is produced once per frame even
/// while input keeps arriving, so a busy user cannot stall the clock.
pub struct Runner<E: EventSource> {
    source: E,
    frame: Duration,
    next_frame: Instant,
}

impl<E: EventSource> Runner<E> {
    pub fn new(source: E, frame: Duration) -> Self {
        Self {
            source,
            frame,
            next_frame: Instant::now() + frame,
        }
    }

    pub fn step(&mut self) -> AppEvent {
        self.step_at(Instant::now())
    }

    fn step_at(&mut self, now: Instant) -> AppEvent {
        if now >= self.next_frame {
            self.next_frame = now + self.frame;
            return AppEvent::Tick;
        }

        let wait = self.next_frame - now;
        match self.source.recv_timeout(wait) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => {
                self.next_frame += self.frame;
                AppEvent::Tick
            }
            Err(RecvTimeoutError::Disconnected) => {
                // nothing more will arrive; keep the frame rate instead of spinning
                thread::sleep(wait);
                self.next_frame += self.frame;
                AppEvent::Tick
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers, MouseButton};

    fn mouse(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 3,
            row: 4,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn idle_runner_ticks() {
        let (_tx, source) = ChannelSource::pair();
        let mut runner = Runner::new(source, Duration::from_millis(1));
        assert!(matches!(runner.step(), AppEvent::Tick));
    }

    #[test]
    fn queued_input_is_returned_in_order() {
        let (tx, source) = ChannelSource::pair();
        tx.send(AppEvent::Resize).unwrap();
        tx.send(AppEvent::Mouse(mouse(MouseEventKind::Down(MouseButton::Left))))
            .unwrap();
        let mut runner = Runner::new(source, Duration::from_secs(10));

        assert!(matches!(runner.step(), AppEvent::Resize));
        match runner.step() {
            AppEvent::Mouse(m) => assert_eq!((m.column, m.row), (3, 4)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn due_frame_wins_over_pending_input() {
        let (tx, source) = ChannelSource::pair();
        for _ in 0..3 {
            tx.send(AppEvent::Key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE)))
                .unwrap();
        }
        let mut runner = Runner::new(source, Duration::from_millis(50));
        let frame_due = runner.next_frame;

        assert!(matches!(
            runner.step_at(frame_due - Duration::from_millis(10)),
            AppEvent::Key(_)
        ));
        assert!(matches!(runner.step_at(frame_due), AppEvent::Tick));
        assert!(runner.next_frame > frame_due);
        assert!(matches!(runner.step_at(frame_due), AppEvent::Key(_)));
    }

    #[test]
    fn disconnected_source_keeps_ticking() {
        let (tx, source) = ChannelSource::pair();
        drop(tx);
        let mut runner = Runner::new(source, Duration::from_millis(1));
        assert!(matches!(runner.step(), AppEvent::Tick));
        assert!(matches!(runner.step(), AppEvent::Tick));
    }

    #[test]
    fn pointer_motion_is_not_forwarded() {
        assert!(forward(CtEvent::Mouse(mouse(MouseEventKind::Moved))).is_none());
        assert!(forward(CtEvent::FocusGained).is_none());
        assert!(matches!(
            forward(CtEvent::Mouse(mouse(MouseEventKind::Down(MouseButton::Left)))),
            Some(AppEvent::Mouse(_))
        ));
        assert!(matches!(
            forward(CtEvent::Resize(80, 24)),
            Some(AppEvent::Resize)
        ));
    }
}
