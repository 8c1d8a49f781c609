//! In-process stand-in for the service
//!
//! Implements `session.start` and the UiConf actions against an in-memory
//! map, with the same exception codes the real service uses. Faults can be
//! scripted per endpoint to exercise failure paths: a scripted failure
//! answers with an API exception, a scripted stall never answers.

use super::Transport;
use crate::error::{OvpError, OvpResult};
use crate::logging::log_debug;
use crate::request::ApiCall;
use crate::types::{SessionType, UiConf, UiConfFilter, UiConfListResponse};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

/// First id handed out by `uiconf.add`
const FIRST_UI_CONF_ID: i64 = 40_000_000;

#[derive(Debug, Clone, PartialEq)]
enum FaultKind {
    Fail { code: String, message: String },
    Stall,
}

#[derive(Debug, Clone)]
struct Fault {
    endpoint: String,
    kind: FaultKind,
}

#[derive(Debug)]
struct MemoryState {
    ui_confs: BTreeMap<i64, UiConf>,
    next_id: i64,
    sessions: HashSet<String>,
    calls: Vec<ApiCall>,
    faults: Vec<Fault>,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            ui_confs: BTreeMap::new(),
            next_id: FIRST_UI_CONF_ID,
            sessions: HashSet::new(),
            calls: Vec::new(),
            faults: Vec::new(),
        }
    }
}

/// In-memory UiConf service
#[derive(Debug)]
pub struct MemoryTransport {
    partner_id: i64,
    admin_secret: String,
    user_secret: String,
    state: Mutex<MemoryState>,
}

impl MemoryTransport {
    pub fn new(
        partner_id: i64,
        admin_secret: impl Into<String>,
        user_secret: impl Into<String>,
    ) -> Self {
        Self {
            partner_id,
            admin_secret: admin_secret.into(),
            user_secret: user_secret.into(),
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Answer the next call to `service.action` with an API exception
    pub fn fail_next(&self, endpoint: &str, code: &str, message: &str) {
        self.state.lock().faults.push(Fault {
            endpoint: endpoint.to_string(),
            kind: FaultKind::Fail {
                code: code.to_string(),
                message: message.to_string(),
            },
        });
    }

    /// Never answer the next call to `service.action`
    pub fn stall_next(&self, endpoint: &str) {
        self.state.lock().faults.push(Fault {
            endpoint: endpoint.to_string(),
            kind: FaultKind::Stall,
        });
    }

    /// Ids of the UiConf objects currently stored, ascending
    pub fn ui_conf_ids(&self) -> Vec<i64> {
        self.state.lock().ui_confs.keys().copied().collect()
    }

    pub fn ui_conf(&self, id: i64) -> Option<UiConf> {
        self.state.lock().ui_confs.get(&id).cloned()
    }

    /// Every call received so far, in arrival order
    pub fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().calls.clone()
    }

    /// Endpoints (`service.action`) received so far, in arrival order
    pub fn endpoints(&self) -> Vec<String> {
        self.state.lock().calls.iter().map(ApiCall::endpoint).collect()
    }

    /// Ids passed to `uiconf.delete`, in arrival order
    pub fn deleted_ids(&self) -> Vec<i64> {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| call.service == "uiconf" && call.action == "delete")
            .filter_map(|call| call.param("id").and_then(Value::as_i64))
            .collect()
    }

    fn take_fault(state: &mut MemoryState, endpoint: &str) -> Option<FaultKind> {
        let index = state.faults.iter().position(|f| f.endpoint == endpoint)?;
        Some(state.faults.remove(index).kind)
    }

    fn handle(&self, state: &mut MemoryState, call: &ApiCall) -> OvpResult<Value> {
        match (call.service.as_str(), call.action.as_str()) {
            ("session", "start") => self.start_session(state, call),
            ("uiconf", action) => {
                Self::require_session(state, call)?;
                match action {
                    "add" => self.add_ui_conf(state, call),
                    "get" => Self::get_ui_conf(state, call),
                    "update" => Self::update_ui_conf(state, call),
                    "delete" => Self::delete_ui_conf(state, call),
                    "list" => Self::list_ui_confs(state, call),
                    _ => Err(OvpError::api(
                        "ACTION_DOES_NOT_EXISTS",
                        format!("Action \"{action}\" does not exist for service \"uiconf\""),
                    )),
                }
            }
            (service, _) => Err(OvpError::api(
                "SERVICE_DOES_NOT_EXISTS",
                format!("Service \"{service}\" does not exist"),
            )),
        }
    }

    fn start_session(&self, state: &mut MemoryState, call: &ApiCall) -> OvpResult<Value> {
        let secret = call.param("secret").and_then(Value::as_str).unwrap_or_default();
        let partner_id = call.param("partnerId").and_then(Value::as_i64);
        let session_type = call
            .param("type")
            .cloned()
            .map(serde_json::from_value::<SessionType>)
            .transpose()
            .map_err(|e| OvpError::api("INVALID_SESSION_TYPE", e.to_string()))?
            .unwrap_or(SessionType::User);

        let expected = match session_type {
            SessionType::Admin => &self.admin_secret,
            SessionType::User => &self.user_secret,
        };
        if partner_id != Some(self.partner_id) || secret != expected {
            return Err(OvpError::api(
                "START_SESSION_ERROR",
                "Error while starting session for partner",
            ));
        }

        let ks = format!("mem-{session_type}-{}", Uuid::new_v4().simple());
        state.sessions.insert(ks.clone());
        Ok(Value::String(ks))
    }

    fn require_session(state: &MemoryState, call: &ApiCall) -> OvpResult<()> {
        match call.ks() {
            Some(ks) if state.sessions.contains(ks) => Ok(()),
            Some(_) => Err(OvpError::api("INVALID_KS", "Invalid KS")),
            None => Err(OvpError::api("MISSING_KS", "Missing KS. Session not established")),
        }
    }

    fn id_param(call: &ApiCall) -> OvpResult<i64> {
        call.param("id").and_then(Value::as_i64).ok_or_else(|| {
            OvpError::api("MISSING_MANDATORY_PARAMETER", "Missing parameter \"id\"")
        })
    }

    fn ui_conf_param(call: &ApiCall) -> OvpResult<UiConf> {
        let raw = call.param("uiConf").cloned().ok_or_else(|| {
            OvpError::api("MISSING_MANDATORY_PARAMETER", "Missing parameter \"uiConf\"")
        })?;
        serde_json::from_value(raw)
            .map_err(|e| OvpError::api("INVALID_OBJECT_TYPE", e.to_string()))
    }

    fn not_found(id: i64) -> OvpError {
        OvpError::api("UICONF_ID_NOT_FOUND", format!("Ui conf id [{id}] not found"))
    }

    fn encode(ui_conf: &UiConf) -> OvpResult<Value> {
        serde_json::to_value(ui_conf)
            .map_err(|e| OvpError::response_parsing_error(e.to_string()))
    }

    fn add_ui_conf(&self, state: &mut MemoryState, call: &ApiCall) -> OvpResult<Value> {
        let mut ui_conf = Self::ui_conf_param(call)?.without_read_only();
        let id = state.next_id;
        state.next_id += 1;

        let now = Utc::now();
        ui_conf.id = Some(id);
        ui_conf.partner_id = Some(self.partner_id);
        ui_conf.version = Some("1".to_string());
        ui_conf.created_at = Some(now);
        ui_conf.updated_at = Some(now);

        let encoded = Self::encode(&ui_conf)?;
        state.ui_confs.insert(id, ui_conf);
        Ok(encoded)
    }

    fn get_ui_conf(state: &MemoryState, call: &ApiCall) -> OvpResult<Value> {
        let id = Self::id_param(call)?;
        let ui_conf = state.ui_confs.get(&id).ok_or_else(|| Self::not_found(id))?;
        Self::encode(ui_conf)
    }

    fn update_ui_conf(state: &mut MemoryState, call: &ApiCall) -> OvpResult<Value> {
        let id = Self::id_param(call)?;
        let patch = Self::ui_conf_param(call)?;
        let stored = state.ui_confs.get_mut(&id).ok_or_else(|| Self::not_found(id))?;

        macro_rules! apply {
            ($($field:ident),*) => {
                $(if patch.$field.is_some() { stored.$field = patch.$field.clone(); })*
            };
        }
        apply!(
            name,
            description,
            obj_type,
            width,
            height,
            html_params,
            swf_url,
            conf_file,
            conf_vars,
            tags,
            creation_mode
        );

        let version = stored
            .version
            .as_deref()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0)
            + 1;
        stored.version = Some(version.to_string());
        stored.updated_at = Some(Utc::now());

        Self::encode(stored)
    }

    fn delete_ui_conf(state: &mut MemoryState, call: &ApiCall) -> OvpResult<Value> {
        let id = Self::id_param(call)?;
        state
            .ui_confs
            .remove(&id)
            .map(|_| Value::Null)
            .ok_or_else(|| Self::not_found(id))
    }

    fn list_ui_confs(state: &MemoryState, call: &ApiCall) -> OvpResult<Value> {
        let filter = match call.param("filter") {
            Some(raw) => serde_json::from_value::<UiConfFilter>(raw.clone())
                .map_err(|e| OvpError::api("INVALID_OBJECT_TYPE", e.to_string()))?,
            None => UiConfFilter::default(),
        };

        let objects: Vec<UiConf> = state
            .ui_confs
            .values()
            .filter(|ui_conf| filter.matches(ui_conf))
            .cloned()
            .collect();
        let response = UiConfListResponse {
            total_count: objects.len() as i64,
            objects,
        };

        serde_json::to_value(response)
            .map_err(|e| OvpError::response_parsing_error(e.to_string()))
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, call: &ApiCall) -> OvpResult<Value> {
        let endpoint = call.endpoint();
        let outcome = {
            let mut state = self.state.lock();
            state.calls.push(call.clone());
            match Self::take_fault(&mut state, &endpoint) {
                Some(FaultKind::Stall) => None,
                Some(FaultKind::Fail { code, message }) => Some(Err(OvpError::api(code, message))),
                None => Some(self.handle(&mut state, call)),
            }
        };

        log_debug!(
            transport = "memory",
            request_id = %call.request_id,
            endpoint = %endpoint,
            stalled = outcome.is_none(),
            "Memory transport handled call"
        );

        match outcome {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
