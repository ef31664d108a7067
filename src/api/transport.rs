//! Purpose: HTTP collaborator seam and the default blocking implementation.
//! Exports: `Transport` trait, `UreqTransport`.
//! Role: Isolates the client from transport mechanics; tests inject mocks.
//! Invariants: HTTP error statuses still return the body (the remote API
//! reports failure via `status: 0` in JSON); only connection-level failures
//! are errors.
//! Invariants: TLS certificate verification is on unless explicitly skipped.

use crate::core::error::{Error, ErrorKind};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use ureq::rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use ureq::rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use ureq::rustls::{DigitallySignedStruct, Error as TlsError, SignatureScheme};
use url::Url;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking HTTP collaborator used by the client for every network call.
///
/// `form` carries the body fields for POST requests and is ignored for GET
/// (GET parameters ride in the URL query). Implementations return the raw
/// response body; the client decodes it as JSON.
pub trait Transport {
    fn request(
        &self,
        method: &str,
        url: &Url,
        form: &[(&'static str, String)],
    ) -> Result<String, Error>;
}

/// Default transport: a `ureq` agent with rustls TLS.
#[derive(Debug)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

#[derive(Debug)]
struct AcceptAllServerCertVerifier;

impl ServerCertVerifier for AcceptAllServerCertVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, TlsError> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        ureq::rustls::crypto::aws_lc_rs::default_provider()
            .signature_verification_algorithms
            .supported_schemes()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(DEFAULT_TIMEOUT).build(),
        }
    }

    /// Overall request timeout (connect plus transfer). Default is 30s.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    /// Trust a custom CA bundle (PEM) instead of the system roots, for
    /// self-hosted API gateways.
    pub fn with_tls_ca_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let cert_bytes = std::fs::read(path).map_err(|err| {
            Error::new(ErrorKind::Usage)
                .with_message("failed to read TLS CA/certificate file")
                .with_source(err)
        })?;
        let mut cert_reader = Cursor::new(cert_bytes);
        let certs = rustls_pemfile::certs(&mut cert_reader)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| {
                Error::new(ErrorKind::Usage)
                    .with_message("failed to parse TLS CA/certificate file")
                    .with_source(err)
            })?;
        if certs.is_empty() {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("TLS CA/certificate file contains no certificates"));
        }

        let _ = ureq::rustls::crypto::aws_lc_rs::default_provider().install_default();
        let mut root_store = ureq::rustls::RootCertStore::empty();
        let (added, _) = root_store.add_parsable_certificates(certs);
        if added == 0 {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("TLS CA/certificate file contains no parsable certificates"));
        }

        let tls_config = ureq::rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();
        let agent = ureq::builder()
            .tls_config(Arc::new(tls_config))
            .timeout(DEFAULT_TIMEOUT)
            .build();
        Ok(Self { agent })
    }

    /// Disable TLS peer verification. Explicit opt-out for test rigs and
    /// broken intermediaries; never the default.
    pub fn with_tls_skip_verify() -> Self {
        let _ = ureq::rustls::crypto::aws_lc_rs::default_provider().install_default();
        let tls_config = ureq::rustls::ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAllServerCertVerifier))
            .with_no_client_auth();
        let agent = ureq::builder()
            .tls_config(Arc::new(tls_config))
            .timeout(DEFAULT_TIMEOUT)
            .build();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn request(
        &self,
        method: &str,
        url: &Url,
        form: &[(&'static str, String)],
    ) -> Result<String, Error> {
        tracing::trace!(method, url = %url, "dispatching request");
        let request = self
            .agent
            .request(method, url.as_str())
            .set("Accept", "application/json");
        let response = if method == "GET" {
            request.call()
        } else {
            let pairs: Vec<(&str, &str)> = form
                .iter()
                .map(|(name, value)| (*name, value.as_str()))
                .collect();
            request.send_form(&pairs)
        };

        let body = match response {
            Ok(resp) => resp.into_string(),
            // The API signals failure in the JSON body; surface it to the
            // caller rather than treating the HTTP status as transport loss.
            Err(ureq::Error::Status(_code, resp)) => resp.into_string(),
            Err(ureq::Error::Transport(err)) => {
                return Err(Error::new(ErrorKind::Io)
                    .with_message("request failed")
                    .with_endpoint(url.as_str())
                    .with_source(err));
            }
        };
        body.map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read response body")
                .with_endpoint(url.as_str())
                .with_source(err)
        })
    }
}
