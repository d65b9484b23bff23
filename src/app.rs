use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::config::Settings;
use crate::monitor::{PollLoop, SharedState, TopSampler};
use crate::notify::Notifier;
use crate::ui::{DisplaySink, LogSink};

/// Main application state
pub struct App {
    settings: Arc<Settings>,
    state: SharedState,
    stop: Option<Arc<AtomicBool>>,
    poller: Option<JoinHandle<()>>,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
            state: SharedState::new(),
            stop: None,
            poller: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Start the poll worker, publishing to `sink`
    fn start_polling(&mut self, sink: Box<dyn DisplaySink>) -> std::io::Result<()> {
        let mut poll = PollLoop::new(
            Box::new(TopSampler::new()),
            self.state.clone(),
            self.settings.clone(),
            sink,
        );

        if let Some(endpoint) = &self.settings.endpoint {
            match Notifier::new(endpoint.clone()) {
                Ok(notifier) => {
                    log::info!("Sending thermal state to {}", endpoint);
                    poll = poll.with_notifier(Box::new(notifier));
                }
                Err(e) => log::warn!("ESP32 notifications disabled: {}", e),
            }
        }

        self.stop = Some(poll.stop_handle());
        self.poller = Some(poll.spawn()?);
        Ok(())
    }

    /// Run with the tray indicator until "Quit" is chosen
    #[cfg(feature = "tray")]
    pub fn run_tray(mut self) -> anyhow::Result<()> {
        use glib::ControlFlow;
        use std::cell::RefCell;
        use std::path::PathBuf;
        use std::rc::Rc;
        use std::time::Duration;

        use crate::config::open_config_file;
        use crate::ui::{ChannelSink, TrayCallbacks, TrayManager};

        gtk::init()?;
        glib::set_application_name("Kernel Task Monitor");
        glib::set_prgname(Some("ktm"));

        let tray = Rc::new(RefCell::new(TrayManager::new(&self.settings)));

        let config_path: PathBuf = self.settings.config_path.clone();
        tray.borrow().set_callbacks(TrayCallbacks {
            on_configure: Box::new(move || {
                log::info!("Opening configuration file...");
                open_config_file(&config_path);
            }),
            on_quit: Box::new(|| {
                gtk::main_quit();
            }),
        });

        let (tx, rx) = mpsc::channel();
        self.start_polling(Box::new(ChannelSink::new(tx)))?;

        // Drain updates from the poll worker on the GTK thread
        let tray_ref = tray.clone();
        glib::timeout_add_local(Duration::from_millis(200), move || {
            loop {
                match rx.try_recv() {
                    Ok(update) => tray_ref.borrow_mut().apply(&update),
                    Err(mpsc::TryRecvError::Empty) => return ControlFlow::Continue,
                    Err(mpsc::TryRecvError::Disconnected) => return ControlFlow::Break,
                }
            }
        });

        gtk::main();

        tray.borrow_mut().hide();
        self.shutdown();
        Ok(())
    }

    /// Run without a tray, logging state changes until Ctrl-C
    pub fn run_headless(mut self) -> anyhow::Result<()> {
        self.start_polling(Box::new(LogSink::new()))?;

        let (tx, rx) = mpsc::channel();
        ctrlc::set_handler(move || {
            let _ = tx.send(());
        })?;

        log::info!("Running headless, press Ctrl-C to quit");
        let _ = rx.recv();
        self.shutdown();
        Ok(())
    }

    /// Ask the poll worker to stop.
    ///
    /// The worker may be inside a one-second `top` call, so it is not joined.
    pub fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            stop.store(true, Ordering::Relaxed);
        }
        if let Some(poller) = self.poller.take() {
            if poller.is_finished() {
                let _ = poller.join();
            }
        }

        let last = self.state.snapshot();
        if last.has_sample() {
            log::debug!("Last kernel_task reading: {:.1}%", last.cpu_percent);
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}
