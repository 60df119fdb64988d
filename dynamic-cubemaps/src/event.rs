use std::sync::mpsc;

use log::warn;

use crate::Settings;

/// Notification from the host; queued and applied at the start of the next
/// tick, before any stage runs.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Loading screen has been closed (e.g. after a cell transition); both
    /// variants recapture from scratch
    LoadingFinished,

    /// Kernel sources have changed on disk
    ShadersChanged,

    /// Scene has entered or left the full-reflections mode (e.g. the sky
    /// became fully visible)
    SceneModeChanged { full_reflections: bool },

    SettingsChanged(Settings),
}

/// Cloneable handle for sending events, possibly from other threads.
#[derive(Clone, Debug)]
pub struct EventSender {
    tx: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn send(&self, event: Event) {
        if self.tx.send(event).is_err() {
            warn!("Dropping event - dynamic cubemaps are gone");
        }
    }
}

#[derive(Debug)]
pub(crate) struct EventQueue {
    tx: mpsc::Sender<Event>,
    rx: mpsc::Receiver<Event>,
}

impl EventQueue {
    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    /// Returns all events sent so far, in the order they were sent.
    pub fn drain(&self) -> impl Iterator<Item = Event> + '_ {
        self.rx.try_iter()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel();

        Self { tx, rx }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn drain() {
        let target = EventQueue::default();
        let sender = target.sender();

        sender.send(Event::LoadingFinished);
        sender.send(Event::ShadersChanged);

        thread::spawn({
            let sender = sender.clone();

            move || {
                sender.send(Event::SceneModeChanged {
                    full_reflections: true,
                });
            }
        })
        .join()
        .unwrap();

        let events: Vec<_> = target.drain().collect();

        assert_eq!(
            vec![
                Event::LoadingFinished,
                Event::ShadersChanged,
                Event::SceneModeChanged {
                    full_reflections: true
                },
            ],
            events
        );

        assert_eq!(0, target.drain().count());
    }
}
