//! Dispatcher - プロトコルの状態機械
//!
//! # ルーティング
//! | method | task param | state |
//! |---|---|---|
//! | GET | なし | Describe |
//! | GET | あり | AsyncPoll |
//! | POST | - | SyncProcess / AsyncSubmit（1 件でも遅延すれば AsyncSubmit） |
//! | その他 | - | MethodNotAllowed |
//!
//! # POST の流れ
//! 1. Content-Type から decoder を選び body を decode（失敗なら 400、変換は呼ばない）
//! 2. 入力クラスで型付けされた subject ごとに Entity を切り出す
//! 3. Service::invocation で同期／非同期を選ぶ
//!    - 同期: 並行に process してすべての出力を merge
//!    - 非同期: TaskManager に submit し、`rdfs:isDefinedBy <task url>` を返す
//! 4. 全 entity の処理後に Accept で選んだ codec で encode

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use futures::FutureExt;
use futures::future::join_all;
use http::header::{ACCEPT, ALLOW, CONTENT_TYPE, LOCATION, PRAGMA, RETRY_AFTER};
use http::{Method, StatusCode};
use tracing::{debug, warn};

use crate::app::builder::DispatcherBuilder;
use crate::app::config::ServiceConfig;
use crate::app::http::{ServiceRequest, ServiceResponse};
use crate::app::reaper_loop::Reaper;
use crate::app::task_manager::TaskManager;
use crate::domain::vocab::rdfs;
use crate::domain::{Entity, Graph, PollResult, TaskId, Term};
use crate::error::SadiError;
use crate::format::{FormatRegistry, negotiate, negotiate_decoder};
use crate::service::{Invocation, ParameterSpec, Service, describe};

/// Name of the query parameter carrying a task token.
pub const TASK_PARAM: &str = "task";

/// Where a request ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchState {
    Describe,
    SyncProcess,
    AsyncSubmit,
    AsyncPoll,
    MethodNotAllowed,
}

/// Response plus the state that produced it.
#[derive(Debug)]
pub struct Dispatched {
    pub state: DispatchState,
    pub response: ServiceResponse,
}

/// One service published over HTTP.
///
/// 構築後は不変（task table を除く）。`Arc<Dispatcher>` で handler 間に共有する。
pub struct Dispatcher {
    pub(crate) service: Arc<dyn Service>,
    pub(crate) registry: Arc<FormatRegistry>,
    pub(crate) config: ServiceConfig,
    pub(crate) tasks: TaskManager,
    pub(crate) parameters: Option<ParameterSpec>,
    pub(crate) description: OnceLock<Graph>,
}

impl Dispatcher {
    pub fn builder(service: Arc<dyn Service>) -> DispatcherBuilder {
        DispatcherBuilder::new(service)
    }

    pub fn tasks(&self) -> &TaskManager {
        &self.tasks
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    /// Start the eviction loop when a task TTL is configured.
    pub fn spawn_reaper(&self) -> Option<Reaper> {
        let ttl = self.config.task_ttl()?;
        Some(Reaper::spawn(self.tasks.clone(), ttl, self.config.reap_interval()))
    }

    /// Service description; the subject is fixed by the first call.
    pub fn description(&self, base_url: &str) -> &Graph {
        self.description.get_or_init(|| {
            describe(
                self.config.service_url.as_deref().unwrap_or(base_url),
                self.service.definition(),
                self.parameters.as_ref(),
            )
        })
    }

    /// Initial routing decision. POST may still become `AsyncSubmit`.
    pub fn route(&self, request: &ServiceRequest) -> DispatchState {
        match request.method {
            Method::GET if request.query_param(TASK_PARAM).is_some() => DispatchState::AsyncPoll,
            Method::GET => DispatchState::Describe,
            Method::POST => DispatchState::SyncProcess,
            _ => DispatchState::MethodNotAllowed,
        }
    }

    pub async fn dispatch(&self, request: ServiceRequest) -> ServiceResponse {
        self.handle(request).await.response
    }

    pub async fn handle(&self, request: ServiceRequest) -> Dispatched {
        let state = self.route(&request);
        debug!(method = %request.method, state = ?state, "dispatching request");

        match state {
            DispatchState::Describe => Dispatched {
                state,
                response: self.describe(&request),
            },
            DispatchState::AsyncPoll => Dispatched {
                state,
                response: self.poll(&request).await,
            },
            DispatchState::SyncProcess | DispatchState::AsyncSubmit => self.process(&request).await,
            DispatchState::MethodNotAllowed => {
                let err = SadiError::MethodNotAllowed(request.method.to_string());
                debug!(error = %err, "rejecting request");
                let mut response = ServiceResponse::text(err.status(), "Error 405: Method Not Allowed");
                response.set_header(ALLOW, "GET, POST");
                Dispatched { state, response }
            }
        }
    }

    fn base_url<'a>(&'a self, request: &'a ServiceRequest) -> &'a str {
        self.config
            .service_url
            .as_deref()
            .unwrap_or(&request.base_url)
    }

    fn task_url(&self, request: &ServiceRequest, id: &TaskId) -> String {
        format!("{}?{TASK_PARAM}={id}", self.base_url(request))
    }

    fn describe(&self, request: &ServiceRequest) -> ServiceResponse {
        let description = self.description(&request.base_url);
        self.encode(StatusCode::OK, request, description)
    }

    async fn poll(&self, request: &ServiceRequest) -> ServiceResponse {
        let token = request.query_param(TASK_PARAM).unwrap_or_default();
        let Ok(id) = token.parse::<TaskId>() else {
            debug!(token, "malformed task token");
            return not_found(&SadiError::TaskNotFound(token.to_string()));
        };

        let result = if self.config.consume_on_poll {
            self.tasks.consume(&id).await
        } else {
            self.tasks.poll(&id).await
        };

        match result {
            PollResult::Done(graph) => self.encode(StatusCode::OK, request, &graph),
            PollResult::Pending => self.please_wait(request, &id),
            PollResult::NotFound => not_found(&SadiError::task_not_found(&id)),
            PollResult::Failed(failure) => ServiceResponse::text(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error 500: task {id} failed: {failure}"),
            ),
        }
    }

    fn please_wait(&self, request: &ServiceRequest, id: &TaskId) -> ServiceResponse {
        let wait = self
            .service
            .suggested_wait(id)
            .unwrap_or_else(|| self.config.poll_wait());
        let url = self.task_url(request, id);

        let mut response =
            ServiceResponse::text(StatusCode::FOUND, format!("task {id} is still running"));
        if !response.set_header(LOCATION, &url) {
            warn!(url = %url, "task URL is not a valid Location header");
        }
        response.set_header(PRAGMA, &format!("sadi-please-wait = {}", wait.as_millis()));
        response.set_header(RETRY_AFTER, &retry_after_secs(wait).to_string());
        response
    }

    async fn process(&self, request: &ServiceRequest) -> Dispatched {
        let content_type = request.header(&CONTENT_TYPE);
        let Some((_, decoder)) = negotiate_decoder(content_type, &self.registry) else {
            return Dispatched {
                state: DispatchState::SyncProcess,
                response: unsupported(),
            };
        };
        let input = match decoder.decode(&request.body, content_type) {
            Ok(graph) => graph,
            Err(err) => {
                let err = SadiError::Decode(err);
                debug!(error = %err, "rejecting request body");
                return Dispatched {
                    state: DispatchState::SyncProcess,
                    response: ServiceResponse::text(err.status(), format!("Error 400: {err}")),
                };
            }
        };

        let definition = self.service.definition();
        let entities: Vec<Entity> = input
            .instances_of(&definition.input_class)
            .into_iter()
            .map(|subject| Entity::from_graph(subject, &input))
            .collect();

        let mut output = Graph::new();
        let mut sync = Vec::new();
        let mut deferred = 0usize;
        for entity in entities {
            match self.service.invocation(&entity) {
                Invocation::Sync => sync.push(entity),
                Invocation::Async => {
                    let subject = entity.subject().clone();
                    let id = self.submit(entity).await;
                    let mut placeholder = Entity::new(subject);
                    placeholder
                        .add_type(&definition.output_class)
                        .add(rdfs::IS_DEFINED_BY, Term::iri(self.task_url(request, &id)));
                    output.merge(placeholder.into_graph());
                    deferred += 1;
                }
            }
        }

        let results = join_all(sync.into_iter().map(|entity| self.transform(entity))).await;
        for result in results {
            match result {
                Ok(graph) => output.merge(graph),
                Err(err) => {
                    warn!(error = %err, "synchronous transform failed");
                    return Dispatched {
                        state: if deferred > 0 {
                            DispatchState::AsyncSubmit
                        } else {
                            DispatchState::SyncProcess
                        },
                        response: ServiceResponse::text(err.status(), format!("Error 500: {err}")),
                    };
                }
            }
        }

        let (state, status) = if deferred > 0 {
            (DispatchState::AsyncSubmit, StatusCode::ACCEPTED)
        } else {
            (DispatchState::SyncProcess, StatusCode::OK)
        };
        Dispatched {
            state,
            response: self.encode(status, request, &output),
        }
    }

    async fn submit(&self, entity: Entity) -> TaskId {
        let service = Arc::clone(&self.service);
        let output_class = self.service.definition().output_class.clone();
        self.tasks
            .submit(entity, move |input| async move {
                let output = input.output_of(&output_class);
                service.process(input, output).await.map(Entity::into_graph)
            })
            .await
    }

    /// Run one synchronous transform; errors and panics become `TransformFailure`.
    async fn transform(&self, input: Entity) -> Result<Graph, SadiError> {
        let subject = input.subject().to_string();
        let output = input.output_of(&self.service.definition().output_class);
        match AssertUnwindSafe(self.service.process(input, output))
            .catch_unwind()
            .await
        {
            Ok(Ok(entity)) => Ok(entity.into_graph()),
            Ok(Err(err)) => Err(SadiError::TransformFailure {
                subject,
                message: err.to_string(),
            }),
            Err(_) => Err(SadiError::TransformFailure {
                subject,
                message: "transform panicked".to_string(),
            }),
        }
    }

    /// Encode `graph` in the format negotiated from `Accept`.
    fn encode(&self, status: StatusCode, request: &ServiceRequest, graph: &Graph) -> ServiceResponse {
        let Some((content_type, codec)) = negotiate(request.header(&ACCEPT), &self.registry) else {
            return unsupported();
        };
        match codec.encode(graph) {
            Ok(body) => ServiceResponse::graph(status, &content_type.header_value(), body),
            Err(err) => {
                let err = SadiError::Encode(err);
                warn!(error = %err, "failed to encode response");
                ServiceResponse::text(err.status(), format!("Error 500: {err}"))
            }
        }
    }
}

fn not_found(err: &SadiError) -> ServiceResponse {
    ServiceResponse::text(StatusCode::NOT_FOUND, format!("Error 404: {err}"))
}

fn unsupported() -> ServiceResponse {
    ServiceResponse::text(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Error 500: no serialization formats available",
    )
}

/// Advisory wait rendered as whole seconds, rounded up.
pub fn retry_after_secs(wait: Duration) -> u128 {
    wait.as_millis().div_ceil(1000)
}
