//! HTTP control surface.
//!
//! Four routes map onto the application service:
//!
//! | Method | Path   | Body                | Action                          |
//! |--------|--------|---------------------|---------------------------------|
//! | POST   | /time  | `H M S` decimal     | set time                        |
//! | POST   | /alarm | `H M S` decimal     | set alarm (also engages servo)  |
//! | GET    | /temp  | —                   | temperature as decimal text     |
//! | POST   | /servo | `0` or nonzero      | force servo                     |
//!
//! Body parsing is plain text, greedy left-to-right; malformed or
//! out-of-range input gets a 400 and leaves state untouched. `/temp`
//! carries a permissive CORS header so a browser dashboard can poll it
//! directly.
//!
//! The parsers are transport-neutral and host-testable; only the server
//! wiring below is espidf-gated.

use crate::error::TimeError;

// ───────────────────────────────────────────────────────────────
// Body parsers
// ───────────────────────────────────────────────────────────────

/// Parse an `H M S` body: exactly three whitespace-separated decimal
/// fields, left to right. Range checking is the triple constructors' job;
/// anything non-numeric, missing, or trailing is malformed.
pub fn parse_time_body(body: &str) -> Result<(u8, u8, u8), TimeError> {
    let mut fields = body.split_ascii_whitespace();
    let mut next = || -> Result<u8, TimeError> {
        fields
            .next()
            .ok_or(TimeError::Malformed)?
            .parse::<u8>()
            .map_err(|_| TimeError::Malformed)
    };
    let triple = (next()?, next()?, next()?);
    if fields.next().is_some() {
        return Err(TimeError::Malformed);
    }
    Ok(triple)
}

/// Parse a `/servo` body: a decimal number, nonzero = engage.
/// `None` for anything non-numeric.
pub fn parse_servo_body(body: &str) -> Option<bool> {
    body.trim().parse::<i64>().ok().map(|n| n != 0)
}

// ───────────────────────────────────────────────────────────────
// Shared request-side state
// ───────────────────────────────────────────────────────────────

use crate::adapters::hardware::HardwareAdapter;
use crate::adapters::log_sink::LogEventSink;
use crate::app::service::AppService;

/// Everything a request handler needs, behind one mutex: the service plus
/// the hardware and sink ports it is called with. The tick path does not
/// go through this lock — it shares only the clock's critical section and
/// the servo atomic, so a slow request can never stall the clock.
pub struct ServerState<'c> {
    pub app: AppService<'c>,
    pub hw: HardwareAdapter,
    pub sink: LogEventSink,
}

// ───────────────────────────────────────────────────────────────
// Server wiring (espidf)
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use espidf::start;

#[cfg(target_os = "espidf")]
mod espidf {
    use core::fmt::Write as _;
    use std::sync::{Arc, Mutex};

    use esp_idf_svc::http::Method;
    use esp_idf_svc::http::server::{Configuration, EspHttpServer};
    use esp_idf_svc::io::{EspIOError, Read, Write};
    use log::info;

    use super::{ServerState, parse_servo_body, parse_time_body};
    use crate::app::commands::AppCommand;

    type Shared = Arc<Mutex<ServerState<'static>>>;

    /// Read a short request body. Anything longer than the buffer cannot
    /// be a valid command and will fail parsing downstream.
    fn read_body<C: Read>(conn: &mut C) -> Result<heapless::Vec<u8, 32>, C::Error> {
        let mut body = heapless::Vec::new();
        let mut buf = [0u8; 32];
        loop {
            let n = conn.read(&mut buf)?;
            if n == 0 {
                break;
            }
            if body.extend_from_slice(&buf[..n]).is_err() {
                break; // Oversized — keep the prefix, parser rejects it.
            }
        }
        Ok(body)
    }

    /// Start the HTTP control surface. The returned server owns the
    /// listening socket; keep it alive for the life of the process.
    pub fn start(port: u16, state: Shared) -> anyhow::Result<EspHttpServer<'static>> {
        let mut server = EspHttpServer::new(&Configuration {
            http_port: port,
            ..Default::default()
        })?;

        // ── POST /time ────────────────────────────────────────
        let st = state.clone();
        server.fn_handler::<EspIOError, _>("/time", Method::Post, move |mut req| {
            let body = read_body(&mut req)?;
            let parsed = core::str::from_utf8(&body)
                .ok()
                .and_then(|s| parse_time_body(s).ok());
            let Some((h, m, s)) = parsed else {
                req.into_status_response(400)?.flush()?;
                return Ok(());
            };
            let Ok(mut guard) = st.lock() else {
                req.into_status_response(500)?.flush()?;
                return Ok(());
            };
            let state = &mut *guard;
            let cmd = AppCommand::SetTime {
                hours: h,
                minutes: m,
                seconds: s,
            };
            match state.app.handle_command(cmd, &mut state.hw, &mut state.sink) {
                Ok(()) => req.into_ok_response()?.flush()?,
                Err(_) => req.into_status_response(400)?.flush()?,
            }
            Ok(())
        })?;

        // ── POST /alarm ───────────────────────────────────────
        let st = state.clone();
        server.fn_handler::<EspIOError, _>("/alarm", Method::Post, move |mut req| {
            let body = read_body(&mut req)?;
            let parsed = core::str::from_utf8(&body)
                .ok()
                .and_then(|s| parse_time_body(s).ok());
            let Some((h, m, s)) = parsed else {
                req.into_status_response(400)?.flush()?;
                return Ok(());
            };
            let Ok(mut guard) = st.lock() else {
                req.into_status_response(500)?.flush()?;
                return Ok(());
            };
            let state = &mut *guard;
            let cmd = AppCommand::SetAlarm {
                hours: h,
                minutes: m,
                seconds: s,
            };
            match state.app.handle_command(cmd, &mut state.hw, &mut state.sink) {
                Ok(()) => req.into_ok_response()?.flush()?,
                Err(_) => req.into_status_response(400)?.flush()?,
            }
            Ok(())
        })?;

        // ── GET /temp ─────────────────────────────────────────
        let st = state.clone();
        server.fn_handler::<EspIOError, _>("/temp", Method::Get, move |req| {
            let reading = match st.lock() {
                Ok(mut guard) => {
                    let state = &mut *guard;
                    state.app.read_temperature(&mut state.hw)
                }
                Err(_) => {
                    req.into_status_response(500)?.flush()?;
                    return Ok(());
                }
            };
            match reading {
                Ok(r) => {
                    let mut text: heapless::String<64> = heapless::String::new();
                    let _ = write!(text, "{:.6}", r.celsius);
                    let mut resp = req.into_response(
                        200,
                        Some("OK"),
                        &[("Access-Control-Allow-Origin", "*")],
                    )?;
                    resp.write_all(text.as_bytes())?;
                    resp.flush()?;
                }
                Err(_) => req.into_status_response(500)?.flush()?,
            }
            Ok(())
        })?;

        // ── POST /servo ───────────────────────────────────────
        let st = state.clone();
        server.fn_handler::<EspIOError, _>("/servo", Method::Post, move |mut req| {
            let body = read_body(&mut req)?;
            let parsed = core::str::from_utf8(&body).ok().and_then(parse_servo_body);
            let Some(on) = parsed else {
                req.into_status_response(400)?.flush()?;
                return Ok(());
            };
            let Ok(mut guard) = st.lock() else {
                req.into_status_response(500)?.flush()?;
                return Ok(());
            };
            let state = &mut *guard;
            // ForceActuator cannot fail.
            let _ = state
                .app
                .handle_command(AppCommand::ForceActuator(on), &mut state.hw, &mut state.sink);
            req.into_ok_response()?.flush()?;
            Ok(())
        })?;

        info!("server: control surface on port {}", port);
        Ok(server)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_body_parses_three_fields_greedily() {
        assert_eq!(parse_time_body("7 30 0"), Ok((7, 30, 0)));
        assert_eq!(parse_time_body("  12\t59  59 "), Ok((12, 59, 59)));
        assert_eq!(parse_time_body("100 100 100"), Ok((100, 100, 100)));
    }

    #[test]
    fn time_body_rejects_wrong_arity_and_garbage() {
        assert_eq!(parse_time_body(""), Err(TimeError::Malformed));
        assert_eq!(parse_time_body("7 30"), Err(TimeError::Malformed));
        assert_eq!(parse_time_body("7 30 0 extra"), Err(TimeError::Malformed));
        assert_eq!(parse_time_body("7 thirty 0"), Err(TimeError::Malformed));
        assert_eq!(parse_time_body("7 30 999"), Err(TimeError::Malformed)); // > u8
        assert_eq!(parse_time_body("-1 30 0"), Err(TimeError::Malformed));
    }

    #[test]
    fn servo_body_nonzero_engages() {
        assert_eq!(parse_servo_body("1"), Some(true));
        assert_eq!(parse_servo_body("0"), Some(false));
        assert_eq!(parse_servo_body(" 7 \n"), Some(true));
        assert_eq!(parse_servo_body("on"), None);
        assert_eq!(parse_servo_body(""), None);
    }
}
