//! In-process stand-in for the ADB server, speaking the host and sync
//! protocols over a real TCP socket on 127.0.0.1.

use crate::core::types::{DirectoryEntry, ForwardRule};
use std::collections::{HashMap, HashSet};
use std::io::{self, ErrorKind};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

const S_IFREG: u32 = 0o100000;
const S_IFDIR: u32 = 0o040000;
const SERVER_CHUNK: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct FakeFile {
    pub data: Vec<u8>,
    pub mode: u32,
    pub mtime: u32,
}

/// Everything the fake server knows and everything it has observed.
#[derive(Default)]
pub struct FakeState {
    /// `(serial, state word, extra devices -l fields)`
    pub devices: Vec<(String, String, String)>,
    pub files: HashMap<String, FakeFile>,
    pub listings: HashMap<String, Vec<DirectoryEntry>>,
    pub shell_output: HashMap<String, Vec<u8>>,
    /// Shell commands that print their output and then never exit
    pub held_shells: HashSet<String>,
    pub forwards: Vec<ForwardRule>,
    /// Send half of the file on RECV and hang up without DONE
    pub truncate_pulls: bool,
    /// Answer SEND for these path prefixes with FAIL
    pub reject_push: Option<(String, String)>,

    pub commands: Vec<String>,
    pub sync_requests: Vec<String>,
    pub max_data_chunk: usize,
    pub data_frames: usize,
}

impl FakeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, serial: &str) -> Self {
        self.devices.push((
            serial.to_string(),
            "device".to_string(),
            "product:sdk model:Pixel_4 device:generic transport_id:1".to_string(),
        ));
        self
    }

    pub fn with_device_state(mut self, serial: &str, state: &str) -> Self {
        self.devices
            .push((serial.to_string(), state.to_string(), String::new()));
        self
    }

    pub fn with_file(mut self, path: &str, data: &[u8], mtime: u32) -> Self {
        self.files.insert(
            path.to_string(),
            FakeFile {
                data: data.to_vec(),
                mode: S_IFREG | 0o644,
                mtime,
            },
        );
        self
    }

    pub fn with_listing(mut self, path: &str, entries: Vec<DirectoryEntry>) -> Self {
        self.listings.insert(path.to_string(), entries);
        self
    }

    pub fn with_shell(mut self, command: &str, output: &str) -> Self {
        self.shell_output
            .insert(command.to_string(), output.as_bytes().to_vec());
        self
    }

    pub fn with_held_shell(mut self, command: &str, output: &str) -> Self {
        self.held_shells.insert(command.to_string());
        self.with_shell(command, output)
    }

    pub fn with_forward(mut self, serial: &str, local: &str, remote: &str) -> Self {
        self.forwards.push(ForwardRule {
            serial: serial.to_string(),
            local: local.to_string(),
            remote: remote.to_string(),
        });
        self
    }

    pub fn with_truncated_pulls(mut self) -> Self {
        self.truncate_pulls = true;
        self
    }

    pub fn with_push_rejected(mut self, prefix: &str, reason: &str) -> Self {
        self.reject_push = Some((prefix.to_string(), reason.to_string()));
        self
    }

    fn knows(&self, serial: &str) -> Option<&(String, String, String)> {
        self.devices.iter().find(|(s, _, _)| s == serial)
    }
}

pub struct FakeAdbServer {
    address: String,
    state: Arc<Mutex<FakeState>>,
    task: JoinHandle<()>,
}

impl FakeAdbServer {
    pub async fn start(state: FakeState) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let state = Arc::new(Mutex::new(state));

        let shared = state.clone();
        let task = tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let state = shared.clone();
                tokio::spawn(async move {
                    let _ = handle_connection(socket, state).await;
                });
            }
        });

        Self {
            address,
            state,
            task,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

impl Drop for FakeAdbServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn read_host_command(sock: &mut TcpStream) -> io::Result<Option<String>> {
    let mut len = [0u8; 4];
    match sock.read_exact(&mut len).await {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }
    let len = usize::from_str_radix(std::str::from_utf8(&len).unwrap(), 16).unwrap();
    let mut payload = vec![0u8; len];
    sock.read_exact(&mut payload).await?;
    Ok(Some(String::from_utf8(payload).unwrap()))
}

async fn okay(sock: &mut TcpStream) -> io::Result<()> {
    sock.write_all(b"OKAY").await
}

async fn okay_with(sock: &mut TcpStream, reply: &str) -> io::Result<()> {
    sock.write_all(format!("OKAY{:04x}{}", reply.len(), reply).as_bytes())
        .await
}

async fn fail(sock: &mut TcpStream, reason: &str) -> io::Result<()> {
    sock.write_all(format!("FAIL{:04x}{}", reason.len(), reason).as_bytes())
        .await
}

async fn handle_connection(mut sock: TcpStream, state: Arc<Mutex<FakeState>>) -> io::Result<()> {
    let mut transport: Option<String> = None;

    loop {
        let Some(command) = read_host_command(&mut sock).await? else {
            return Ok(());
        };
        state.lock().unwrap().commands.push(command.clone());

        if transport.is_some() {
            return serve_device(sock, &command, state).await;
        }

        if let Some(serial) = command.strip_prefix("host:transport:") {
            let known = state.lock().unwrap().knows(serial).is_some();
            if known {
                okay(&mut sock).await?;
                transport = Some(serial.to_string());
                continue;
            }
            return fail(&mut sock, &format!("device '{}' not found", serial)).await;
        }

        if let Some(rest) = command.strip_prefix("host-serial:") {
            return serve_host_serial(sock, rest, state).await;
        }

        let reply = {
            let st = state.lock().unwrap();
            let reply = match command.as_str() {
                "host:version" => Some("0029".to_string()),
                "host:devices-l" => Some(
                    st.devices
                        .iter()
                        .map(|(s, state, extra)| format!("{}\t{} {}\n", s, state, extra))
                        .collect::<String>(),
                ),
                "host:list-forward" => Some(
                    st.forwards
                        .iter()
                        .map(|f| format!("{} {} {}\n", f.serial, f.local, f.remote))
                        .collect::<String>(),
                ),
                _ => None,
            };
            reply
        };

        return match (command.as_str(), reply) {
            (_, Some(reply)) => okay_with(&mut sock, &reply).await,
            ("host:kill", None) => okay(&mut sock).await,
            ("host:killforward-all", None) => {
                state.lock().unwrap().forwards.clear();
                okay(&mut sock).await
            }
            _ => fail(&mut sock, "unknown host service").await,
        };
    }
}

async fn serve_host_serial(
    mut sock: TcpStream,
    rest: &str,
    state: Arc<Mutex<FakeState>>,
) -> io::Result<()> {
    let Some((serial, subcommand)) = rest.split_once(':') else {
        return fail(&mut sock, "bad host-serial request").await;
    };

    let device_state = match state.lock().unwrap().knows(serial) {
        Some((_, s, _)) => s.clone(),
        None => String::new(),
    };
    if device_state.is_empty() {
        return fail(&mut sock, &format!("device '{}' not found", serial)).await;
    }

    if subcommand == "get-state" {
        return okay_with(&mut sock, &device_state).await;
    }
    if subcommand == "get-devpath" {
        return okay_with(&mut sock, "usb:1-1").await;
    }

    if let Some(rest) = subcommand.strip_prefix("forward:") {
        let (no_rebind, rest) = match rest.strip_prefix("norebind:") {
            Some(rest) => (true, rest),
            None => (false, rest),
        };
        let Some((local, remote)) = rest.split_once(';') else {
            return fail(&mut sock, "malformed forward target").await;
        };

        let outcome = {
            let mut st = state.lock().unwrap();
            let existing = st.forwards.iter().position(|f| f.local == local);
            match (existing, no_rebind) {
                (Some(_), true) => Err("cannot rebind existing socket".to_string()),
                (Some(i), false) => {
                    st.forwards[i].remote = remote.to_string();
                    st.forwards[i].serial = serial.to_string();
                    Ok(())
                }
                (None, _) => {
                    st.forwards.push(ForwardRule {
                        serial: serial.to_string(),
                        local: local.to_string(),
                        remote: remote.to_string(),
                    });
                    Ok(())
                }
            }
        };
        return match outcome {
            Ok(()) => okay(&mut sock).await,
            Err(reason) => fail(&mut sock, &reason).await,
        };
    }

    if let Some(local) = subcommand.strip_prefix("killforward:") {
        let removed = {
            let mut st = state.lock().unwrap();
            let before = st.forwards.len();
            st.forwards.retain(|f| !(f.local == local && f.serial == serial));
            before != st.forwards.len()
        };
        return if removed {
            okay(&mut sock).await
        } else {
            fail(&mut sock, &format!("listener '{}' not found", local)).await
        };
    }

    fail(&mut sock, "unknown host service").await
}

async fn serve_device(
    mut sock: TcpStream,
    command: &str,
    state: Arc<Mutex<FakeState>>,
) -> io::Result<()> {
    if let Some(cmd) = command.strip_prefix("shell:") {
        let (output, held) = {
            let st = state.lock().unwrap();
            let output = st.shell_output.get(cmd).cloned().unwrap_or_else(|| {
                let program = cmd.split_whitespace().next().unwrap_or_default();
                format!("/system/bin/sh: {}: not found\n", program).into_bytes()
            });
            (output, st.held_shells.contains(cmd))
        };
        okay(&mut sock).await?;
        sock.write_all(&output).await?;
        if held {
            // Stay open until the client goes away.
            let mut buf = [0u8; 64];
            while sock.read(&mut buf).await? > 0 {}
            return Ok(());
        }
        return sock.shutdown().await;
    }

    if command == "sync:" {
        okay(&mut sock).await?;
        return serve_sync(sock, state).await;
    }

    if let Some(port) = command.strip_prefix("tcpip:") {
        okay(&mut sock).await?;
        return sock
            .write_all(format!("restarting in TCP mode port: {}\n", port).as_bytes())
            .await;
    }

    fail(&mut sock, "closed").await
}

async fn read_sync_header(sock: &mut TcpStream) -> io::Result<Option<([u8; 4], u32)>> {
    let mut header = [0u8; 8];
    match sock.read_exact(&mut header).await {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }
    let id = [header[0], header[1], header[2], header[3]];
    let word = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    Ok(Some((id, word)))
}

async fn read_string(sock: &mut TcpStream, len: u32) -> io::Result<String> {
    let mut payload = vec![0u8; len as usize];
    sock.read_exact(&mut payload).await?;
    Ok(String::from_utf8_lossy(&payload).into_owned())
}

async fn sync_fail(sock: &mut TcpStream, reason: &str) -> io::Result<()> {
    sock.write_all(b"FAIL").await?;
    sock.write_all(&(reason.len() as u32).to_le_bytes()).await?;
    sock.write_all(reason.as_bytes()).await
}

async fn write_u32s(sock: &mut TcpStream, id: &[u8; 4], values: &[u32]) -> io::Result<()> {
    let mut frame = id.to_vec();
    for v in values {
        frame.extend_from_slice(&v.to_le_bytes());
    }
    sock.write_all(&frame).await
}

fn listing_for(st: &FakeState, path: &str) -> Vec<DirectoryEntry> {
    if let Some(entries) = st.listings.get(path) {
        return entries.clone();
    }
    let prefix = format!("{}/", path.trim_end_matches('/'));
    let mut entries: Vec<DirectoryEntry> = st
        .files
        .iter()
        .filter_map(|(p, f)| {
            let name = p.strip_prefix(&prefix)?;
            (!name.contains('/')).then(|| DirectoryEntry {
                name: name.to_string(),
                mode: f.mode,
                size: f.data.len() as u32,
                mtime: f.mtime,
            })
        })
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}

async fn serve_sync(mut sock: TcpStream, state: Arc<Mutex<FakeState>>) -> io::Result<()> {
    loop {
        let Some((id, len)) = read_sync_header(&mut sock).await? else {
            return Ok(());
        };

        match &id {
            b"LIST" => {
                let path = read_string(&mut sock, len).await?;
                let entries = {
                    let mut st = state.lock().unwrap();
                    st.sync_requests.push(format!("LIST {}", path));
                    listing_for(&st, &path)
                };
                for entry in entries {
                    write_u32s(
                        &mut sock,
                        b"DENT",
                        &[entry.mode, entry.size, entry.mtime, entry.name.len() as u32],
                    )
                    .await?;
                    sock.write_all(entry.name.as_bytes()).await?;
                }
                write_u32s(&mut sock, b"DONE", &[0, 0, 0, 0]).await?;
            }
            b"STAT" => {
                let path = read_string(&mut sock, len).await?;
                let record = {
                    let mut st = state.lock().unwrap();
                    st.sync_requests.push(format!("STAT {}", path));
                    match st.files.get(&path) {
                        Some(f) => [f.mode, f.data.len() as u32, f.mtime],
                        None if st.listings.contains_key(&path) => [S_IFDIR | 0o755, 4096, 0],
                        None => [0, 0, 0],
                    }
                };
                write_u32s(&mut sock, b"STAT", &record).await?;
            }
            b"SEND" => {
                let request = read_string(&mut sock, len).await?;
                let (path, mode) = request.rsplit_once(',').unwrap_or((request.as_str(), "420"));
                let mode: u32 = mode.parse().unwrap_or(0o644);
                let path = path.to_string();
                state.lock().unwrap().sync_requests.push(format!("SEND {}", request));

                let mut data = Vec::new();
                let mtime = loop {
                    let Some((id, word)) = read_sync_header(&mut sock).await? else {
                        return Ok(());
                    };
                    match &id {
                        b"DATA" => {
                            let mut chunk = vec![0u8; word as usize];
                            sock.read_exact(&mut chunk).await?;
                            {
                                let mut st = state.lock().unwrap();
                                st.data_frames += 1;
                                st.max_data_chunk = st.max_data_chunk.max(chunk.len());
                            }
                            data.extend_from_slice(&chunk);
                        }
                        b"DONE" => break word,
                        _ => return sync_fail(&mut sock, "unexpected frame during SEND").await,
                    }
                };

                let rejection = {
                    let st = state.lock().unwrap();
                    st.reject_push
                        .as_ref()
                        .filter(|(prefix, _)| path.starts_with(prefix.as_str()))
                        .map(|(_, reason)| reason.clone())
                };
                match rejection {
                    Some(reason) => sync_fail(&mut sock, &reason).await?,
                    None => {
                        state.lock().unwrap().files.insert(
                            path,
                            FakeFile {
                                data,
                                mode: S_IFREG | (mode & 0o777),
                                mtime,
                            },
                        );
                        write_u32s(&mut sock, b"OKAY", &[0]).await?;
                    }
                }
            }
            b"RECV" => {
                let path = read_string(&mut sock, len).await?;
                let (file, truncate) = {
                    let mut st = state.lock().unwrap();
                    st.sync_requests.push(format!("RECV {}", path));
                    (st.files.get(&path).cloned(), st.truncate_pulls)
                };
                let Some(file) = file else {
                    sync_fail(&mut sock, "No such file or directory").await?;
                    continue;
                };

                if truncate {
                    let half = file.data.len() / 2;
                    write_u32s(&mut sock, b"DATA", &[file.data.len() as u32]).await?;
                    sock.write_all(&file.data[..half]).await?;
                    return sock.shutdown().await;
                }

                for chunk in file.data.chunks(SERVER_CHUNK) {
                    write_u32s(&mut sock, b"DATA", &[chunk.len() as u32]).await?;
                    sock.write_all(chunk).await?;
                }
                write_u32s(&mut sock, b"DONE", &[0]).await?;
            }
            b"QUIT" => return Ok(()),
            _ => return sync_fail(&mut sock, "unknown sync command").await,
        }
    }
}
