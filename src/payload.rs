use minijinja::{Environment, context};
use serde::{Deserialize, Serialize};

use crate::error::SignatureError;
use crate::reconcile::{NormalizedSample, ReconciledDataset};

const TEMPLATE_NAME: &str = "signatures.html";
const TEMPLATE: &str = include_str!("../templates/signatures.html");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub data: PayloadData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadData {
    pub signatures: Vec<String>,
    pub reference: Vec<NormalizedSample>,
    pub query: Vec<NormalizedSample>,
}

impl From<ReconciledDataset> for Payload {
    fn from(dataset: ReconciledDataset) -> Self {
        Self {
            data: PayloadData {
                signatures: dataset.signatures,
                reference: dataset.reference,
                query: dataset.query,
            },
        }
    }
}

pub fn generator() -> String {
    format!("kira-sig {}", env!("CARGO_PKG_VERSION"))
}

pub fn render_json(payload: &Payload) -> Result<String, SignatureError> {
    serde_json::to_string_pretty(payload).map_err(|err| SignatureError::Serialize(err.to_string()))
}

/// Embeds the payload into the bundled HTML page. The template is
/// autoescaped and the payload goes through `tojson`, which escapes `<`, `>`
/// and `&` so sample names cannot close the surrounding `<script>`.
pub fn render_html(payload: &Payload, generator: &str) -> Result<String, SignatureError> {
    let mut env = Environment::new();
    env.add_template(TEMPLATE_NAME, TEMPLATE)
        .map_err(|err| SignatureError::Render(err.to_string()))?;
    let template = env
        .get_template(TEMPLATE_NAME)
        .map_err(|err| SignatureError::Render(err.to_string()))?;
    template
        .render(context! { generator => generator, payload => payload })
        .map_err(|err| SignatureError::Render(err.to_string()))
}
