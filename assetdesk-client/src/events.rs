//! UI event channel
//!
//! The client never draws anything itself. Notices and navigation requests
//! are sent as [`UiEvent`]s to whichever front end owns the receiver.

use crate::session::Identity;
use assetdesk_core::{NoticeLevel, View};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Something the front end should show or do
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Transient message ("toast")
    Notice(Notice),
    /// Switch to another view
    Navigate(View),
    /// The current operator changed; dependent UI should refresh
    SessionChanged(Option<Identity>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
    pub duration: Duration,
}

/// Sending half of the UI channel
///
/// Sends never fail from the caller's point of view; a front end that has
/// gone away simply stops receiving.
#[derive(Debug, Clone)]
pub struct EventSink {
    sender: Option<mpsc::UnboundedSender<UiEvent>>,
    notice_duration: Duration,
}

pub type UiEvents = mpsc::UnboundedReceiver<UiEvent>;

impl EventSink {
    pub fn channel(notice_duration: Duration) -> (Self, UiEvents) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender: Some(sender),
                notice_duration,
            },
            receiver,
        )
    }

    /// A sink with no receiver, for headless use
    pub fn detached() -> Self {
        Self {
            sender: None,
            notice_duration: Duration::ZERO,
        }
    }

    pub fn emit(&self, event: UiEvent) {
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.send(event).is_err() {
            debug!("UI event receiver dropped; event discarded");
        }
    }

    pub fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        self.emit(UiEvent::Notice(Notice {
            message: message.into(),
            level,
            duration: self.notice_duration,
        }));
    }

    pub fn navigate(&self, view: View) {
        self.emit(UiEvent::Navigate(view));
    }

    /// Navigate once `delay` has elapsed, unless the returned handle is cancelled first
    ///
    /// Outside a Tokio runtime there is nothing to schedule on, so the
    /// navigation is emitted right away.
    pub fn navigate_after(&self, view: View, delay: Duration) -> NavigationHandle {
        let Ok(runtime) = Handle::try_current() else {
            debug!(?view, "No runtime for delayed navigation; navigating now");
            self.navigate(view);
            return NavigationHandle { task: None };
        };

        let sink = self.clone();
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            sink.navigate(view);
        });
        NavigationHandle { task: Some(task) }
    }
}

/// A scheduled navigation
#[derive(Debug)]
pub struct NavigationHandle {
    task: Option<JoinHandle<()>>,
}

impl NavigationHandle {
    pub fn cancel(self) {
        if let Some(task) = self.task {
            task.abort();
        }
    }

    /// Wait until the navigation has been emitted (or cancelled)
    pub async fn wait(self) {
        if let Some(task) = self.task {
            let _ = task.await;
        }
    }
}
