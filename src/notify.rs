use reqwest::blocking::Client;
use std::thread;
use std::time::Duration;
use url::Url;

use crate::error::NotifyError;
use crate::monitor::ThermalState;

/// Receiver of each successful cycle's reading
pub trait Notify: Send {
    fn notify(&self, cpu: f64, state: ThermalState);
}

/// Sends the latest reading to the ESP32 receiver.
///
/// Delivery is best effort: one GET per cycle on a detached thread, no retry,
/// failures only reach the log.
#[derive(Clone)]
pub struct Notifier {
    endpoint: Url,
    client: Client,
}

impl Notifier {
    pub const TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(endpoint: Url) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .user_agent(concat!("ktm/", env!("CARGO_PKG_VERSION")))
            .timeout(Self::TIMEOUT)
            .build()?;

        Ok(Self { endpoint, client })
    }

    /// `<endpoint>?kernel_task=45.0&state=Heavy_Load`
    pub fn request_url(&self, cpu: f64, state: ThermalState) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("kernel_task", &format!("{:.1}", cpu))
            .append_pair("state", &state.wire_name());
        url
    }
}

impl Notify for Notifier {
    /// Fire the request and return immediately
    fn notify(&self, cpu: f64, state: ThermalState) {
        let url = self.request_url(cpu, state);
        let client = self.client.clone();

        let spawned = thread::Builder::new()
            .name("ktm-notify".to_string())
            .spawn(move || match send(&client, &url) {
                Ok(()) => log::debug!("Sent to ESP32: kernel_task={:.1}, state={}", cpu, state),
                Err(e) => log::debug!("Error sending data to ESP32: {}", e),
            });

        if let Err(e) = spawned {
            log::warn!("Could not start notifier thread: {}", e);
        }
    }
}

fn send(client: &Client, url: &Url) -> Result<(), NotifyError> {
    let response = client.get(url.clone()).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(NotifyError::Status(status));
    }
    Ok(())
}
