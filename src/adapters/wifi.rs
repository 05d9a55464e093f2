//! WiFi station-mode adapter.
//!
//! Blocking STA bring-up: validate credentials, connect, wait for an IP.
//! The control surface only exists once this succeeds; the clock and servo
//! run regardless, so a failed connect degrades rather than halts.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver via
//!   `esp_idf_svc::wifi::BlockingWifi`.
//! - **all other targets**: simulation stub for host-side tests.

use core::fmt;

use log::info;

// ───────────────────────────────────────────────────────────────
// Errors / validation
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

pub fn validate_credentials(ssid: &str, password: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() {
        return Err(ConnectivityError::NoCredentials);
    }
    if ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    if !password.is_empty() && (password.len() < 8 || password.len() > 64) {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

/// Holds the live WiFi driver so the connection outlives bring-up.
pub struct WifiAdapter {
    #[cfg(target_os = "espidf")]
    _wifi: esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>,
}

impl WifiAdapter {
    /// Validate credentials, connect in station mode, and block until the
    /// interface has an IP.
    #[cfg(target_os = "espidf")]
    pub fn connect(
        modem: esp_idf_hal::modem::Modem,
        sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
        nvs: Option<esp_idf_svc::nvs::EspDefaultNvsPartition>,
        ssid: &str,
        password: &str,
    ) -> anyhow::Result<Self> {
        use esp_idf_svc::wifi::{
            AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi,
        };

        validate_credentials(ssid, password).map_err(|e| anyhow::anyhow!("{e}"))?;

        let mut wifi = BlockingWifi::wrap(
            EspWifi::new(modem, sysloop.clone(), nvs)?,
            sysloop,
        )?;

        let auth_method = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: ssid
                .try_into()
                .map_err(|()| anyhow::anyhow!("SSID too long"))?,
            password: password
                .try_into()
                .map_err(|()| anyhow::anyhow!("password too long"))?,
            auth_method,
            ..Default::default()
        }))?;

        info!("WiFi: connecting to '{}'", ssid);
        wifi.start()?;
        wifi.connect()?;
        wifi.wait_netif_up()?;
        info!("WiFi: connected, interface up");

        Ok(Self { _wifi: wifi })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn connect(ssid: &str, password: &str) -> anyhow::Result<Self> {
        validate_credentials(ssid, password).map_err(|e| anyhow::anyhow!("{e}"))?;
        info!("WiFi(sim): connected to '{}'", ssid);
        Ok(Self {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ssid_is_no_credentials() {
        assert_eq!(
            validate_credentials("", ""),
            Err(ConnectivityError::NoCredentials)
        );
    }

    #[test]
    fn short_wpa2_password_rejected() {
        assert_eq!(
            validate_credentials("home", "short"),
            Err(ConnectivityError::InvalidPassword)
        );
    }

    #[test]
    fn open_network_and_wpa2_accepted() {
        assert!(validate_credentials("home", "").is_ok());
        assert!(validate_credentials("home", "correcthorse").is_ok());
    }

    #[test]
    fn non_printable_ssid_rejected() {
        assert_eq!(
            validate_credentials("bad\u{7}ssid", ""),
            Err(ConnectivityError::InvalidSsid)
        );
    }
}
