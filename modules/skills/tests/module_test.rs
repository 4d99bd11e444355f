use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};

use modkit::{ConfigProvider, Module, ModuleCtxBuilder};
use skills::Skills;

struct Sections(HashMap<String, Value>);

impl ConfigProvider for Sections {
    fn get_module_config(&self, module_name: &str) -> Option<&Value> {
        self.0.get(module_name)
    }
}

#[tokio::test]
async fn init_rejects_invalid_section() {
    let mut sections = HashMap::new();
    sections.insert(Skills::NAME.to_string(), json!({"max_name_lenght": 50}));
    let ctx = ModuleCtxBuilder::new()
        .with_config_provider(Arc::new(Sections(sections)))
        .build()
        .for_module(Skills::NAME);

    let err = Skills::default().init(&ctx).await.unwrap_err();
    assert!(
        err.to_string().contains("invalid modules.skills config"),
        "unexpected error: {err}"
    );
}
