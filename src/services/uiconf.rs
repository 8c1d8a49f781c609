//! UiConf service actions

use crate::client::OvpClient;
use crate::error::{OvpError, OvpResult};
use crate::executor::RequestExecutor;
use crate::harness::resource::ResourceApi;
use crate::request::RequestBuilder;
use crate::types::{UiConf, UiConfCreationMode, UiConfFilter, UiConfListResponse};
use async_trait::async_trait;

/// Request builders for the `uiconf` service
pub struct UiConfService;

impl UiConfService {
    pub const SERVICE: &'static str = "uiconf";

    pub fn add(ui_conf: &UiConf) -> RequestBuilder<UiConf> {
        RequestBuilder::new(Self::SERVICE, "add").param("uiConf", ui_conf.without_read_only())
    }

    pub fn get(id: i64) -> RequestBuilder<UiConf> {
        RequestBuilder::new(Self::SERVICE, "get").param("id", id)
    }

    pub fn update(id: i64, ui_conf: &UiConf) -> RequestBuilder<UiConf> {
        RequestBuilder::new(Self::SERVICE, "update")
            .param("id", id)
            .param("uiConf", ui_conf.without_read_only())
    }

    pub fn delete(id: i64) -> RequestBuilder<()> {
        RequestBuilder::new(Self::SERVICE, "delete").param("id", id)
    }

    pub fn list(filter: Option<&UiConfFilter>) -> RequestBuilder<UiConfListResponse> {
        let builder = RequestBuilder::new(Self::SERVICE, "list");
        match filter {
            Some(filter) => builder.param("filter", filter),
            None => builder,
        }
    }

    /// Player configuration used by the integration tests. It carries a conf
    /// file path that does not exist, so it is not editable in the management
    /// console until a real configuration is attached.
    pub fn test_template(name: &str) -> UiConf {
        UiConf::named(name)
            .with_description("Ui conf unit test")
            .with_dimensions(750, 373)
            .with_creation_mode(UiConfCreationMode::Advanced)
            .with_conf_file("NON_EXISTING_CONF_FILE")
    }
}

/// UiConf actions awaited through an executor
#[derive(Debug, Clone)]
pub struct UiConfResources {
    client: OvpClient,
    executor: RequestExecutor,
}

impl UiConfResources {
    pub fn new(client: OvpClient, executor: RequestExecutor) -> Self {
        Self { client, executor }
    }

    pub async fn update(&self, id: i64, ui_conf: &UiConf) -> OvpResult<UiConf> {
        self.executor
            .execute(&self.client, UiConfService::update(id, ui_conf))
            .await
    }

    pub async fn list(&self, filter: Option<&UiConfFilter>) -> OvpResult<UiConfListResponse> {
        self.executor
            .execute(&self.client, UiConfService::list(filter))
            .await
    }
}

#[async_trait]
impl ResourceApi for UiConfResources {
    type Resource = UiConf;

    fn kind(&self) -> &'static str {
        "ui_conf"
    }

    fn template(&self, name: &str) -> UiConf {
        UiConfService::test_template(name)
    }

    fn id_of(resource: &UiConf) -> Option<i64> {
        resource.id
    }

    async fn create(&self, resource: UiConf) -> OvpResult<UiConf> {
        let created = self
            .executor
            .execute(&self.client, UiConfService::add(&resource))
            .await?;
        if created.id.is_none() {
            return Err(OvpError::response_parsing_error(
                "uiconf.add returned an object without an id",
            ));
        }
        Ok(created)
    }

    async fn fetch(&self, id: i64) -> OvpResult<UiConf> {
        self.executor
            .execute(&self.client, UiConfService::get(id))
            .await
    }

    async fn delete(&self, id: i64) -> OvpResult<()> {
        self.executor
            .execute(&self.client, UiConfService::delete(id))
            .await
    }
}
