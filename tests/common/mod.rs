#![allow(dead_code)]

use cert_courier::core::{CommandOutput, CommandRunner, CommandSpec};
use cert_courier::Result;
use std::path::Path;
use std::sync::Mutex;

type Handler = Box<dyn Fn(&CommandSpec) -> Result<CommandOutput> + Send + Sync>;

/// Fake runner: answers every command through `handler` and records it.
pub struct ScriptedRunner {
    handler: Handler,
    calls: Mutex<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&CommandSpec) -> Result<CommandOutput> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails the test if anything is run.
    pub fn forbidden() -> Self {
        Self::new(|cmd| panic!("unexpected command: {}", cmd))
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(command.clone());
        (self.handler)(command)
    }
}

pub fn exit(status: i32) -> CommandOutput {
    CommandOutput {
        status: Some(status),
        stdout: String::new(),
        stderr: if status == 0 {
            String::new()
        } else {
            format!("exit {}", status)
        },
    }
}

pub fn stdout(text: &str) -> CommandOutput {
    CommandOutput {
        status: Some(0),
        stdout: text.to_string(),
        stderr: String::new(),
    }
}

/// Self-signed certificate for `domain` expiring at midnight UTC on the given date.
/// Returns `(cert_pem, key_pem)`.
pub fn mint_certificate(domain: &str, year: i32, month: u8, day: u8) -> (String, String) {
    let mut params = rcgen::CertificateParams::new(vec![domain.to_string()]).unwrap();
    params.not_after = rcgen::date_time_ymd(year, month, day);
    let key_pair = rcgen::KeyPair::generate().unwrap();
    let cert = params.self_signed(&key_pair).unwrap();
    (cert.pem(), key_pair.serialize_pem())
}

/// Populates `live_dir` the way the issuance client leaves a fresh lineage.
pub fn write_live_bundle(live_dir: &Path, domain: &str) {
    let (leaf, key) = mint_certificate(domain, 2031, 6, 1);
    let (intermediate, _) = mint_certificate("intermediate.test", 2032, 1, 1);
    std::fs::create_dir_all(live_dir).unwrap();
    std::fs::write(live_dir.join("cert.pem"), &leaf).unwrap();
    std::fs::write(live_dir.join("chain.pem"), &intermediate).unwrap();
    std::fs::write(live_dir.join("fullchain.pem"), format!("{}{}", leaf, intermediate)).unwrap();
    std::fs::write(live_dir.join("privkey.pem"), &key).unwrap();
}
