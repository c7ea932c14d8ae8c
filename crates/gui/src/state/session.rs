//! Evaluation session: the definition, the current document and the scene.
//!
//! An evaluation is split in three steps so it can run off the UI thread:
//! [`Session::prepare`] snapshots everything the request needs into an
//! owned [`EvaluationJob`], [`EvaluationJob::run`] does the network call and
//! decoding, and [`Session::install`] swaps the finished document in.

use shared::{DataTree, MeshPayload, ParamValue};

use crate::compute::ComputeClient;
use crate::definition::Definition;
use crate::error::{ConfigError, EvaluationError, LoadError};
use crate::policy::{build_document, build_union_document, Operation, Policy};
use crate::state::document::Document;
use crate::viewport::scene::SceneGraph;

/// One tree per parameter name, each with a single root branch `{0}`.
/// Repeated names append to the same branch in the order given.
pub fn parameter_trees(params: &[(String, ParamValue)]) -> Vec<DataTree> {
    let mut trees: Vec<DataTree> = Vec::new();
    for (name, value) in params {
        match trees.iter_mut().find(|t| &t.param_name == name) {
            Some(tree) => tree.append(shared::BranchPath::root(), [value.to_item()]),
            None => trees.push(DataTree::single(name.clone(), std::slice::from_ref(value))),
        }
    }
    trees
}

enum JobKind {
    Definition {
        definition: Definition,
        trees: Vec<DataTree>,
    },
    MeshUnion {
        meshes: Vec<MeshPayload>,
    },
}

/// Everything one evaluation needs, detached from the session
pub struct EvaluationJob {
    client: ComputeClient,
    policy: Policy,
    kind: JobKind,
}

impl EvaluationJob {
    /// Submit the request and decode the result into a new document.
    pub async fn run(self) -> Result<Document, EvaluationError> {
        match self.kind {
            JobKind::Definition { definition, trees } => {
                tracing::info!(definition = definition.name(), inputs = trees.len(), "Evaluating definition");
                let response = self.client.evaluate_definition(&definition, &trees).await?;
                let document = build_document(&response, &self.policy)?;
                tracing::info!(outputs = response.values.len(), objects = document.len(), "Evaluation finished");
                Ok(document)
            }
            JobKind::MeshUnion { meshes } => {
                tracing::info!(meshes = meshes.len(), "Requesting mesh boolean union");
                let records = self.client.mesh_boolean_union(&meshes).await?;
                let document = build_union_document(&records)?;
                tracing::info!(objects = document.len(), "Boolean union finished");
                Ok(document)
            }
        }
    }
}

/// Client-side state for one viewer session
pub struct Session {
    client: ComputeClient,
    definition: Option<Definition>,
    document: Option<Document>,
    scene: SceneGraph,
    policy: Policy,
    operation: Operation,
    installed: u64,
}

impl Session {
    pub fn new(client: ComputeClient) -> Self {
        Self {
            client,
            definition: None,
            document: None,
            scene: SceneGraph::with_default_lights(),
            policy: Policy::default(),
            operation: Operation::default(),
            installed: 0,
        }
    }

    pub fn configure(&mut self, endpoint: &str, api_key: Option<&str>) -> Result<(), ConfigError> {
        self.client.configure(endpoint, api_key)
    }

    pub fn client(&self) -> &ComputeClient {
        &self.client
    }

    pub fn set_policy(&mut self, policy: Policy, operation: Operation) {
        self.policy = policy;
        self.operation = operation;
    }

    pub fn load_definition(&mut self, definition: Definition) {
        tracing::debug!(name = definition.name(), bytes = definition.bytes().len(), "Definition loaded");
        self.definition = Some(definition);
    }

    pub fn definition(&self) -> Option<&Definition> {
        self.definition.as_ref()
    }

    /// Load a saved document (e.g. the input model of a boolean union)
    pub fn load_model(&mut self, bytes: &[u8]) -> Result<usize, LoadError> {
        let document = Document::from_bytes(bytes)?;
        tracing::info!(objects = document.len(), "Loaded model");
        Ok(self.install(document))
    }

    /// Snapshot a request for the current operation.
    pub fn prepare(&self, params: &[(String, ParamValue)]) -> Result<EvaluationJob, EvaluationError> {
        let kind = match self.operation {
            Operation::Evaluate => {
                let definition = self.definition.clone().ok_or(EvaluationError::NoDefinition)?;
                JobKind::Definition {
                    definition,
                    trees: parameter_trees(params),
                }
            }
            Operation::MeshBooleanUnion => {
                let meshes: Vec<MeshPayload> = self
                    .document
                    .iter()
                    .flat_map(|doc| doc.meshes().cloned())
                    .collect();
                if meshes.is_empty() {
                    return Err(EvaluationError::NoMeshes);
                }
                JobKind::MeshUnion { meshes }
            }
        };
        Ok(EvaluationJob {
            client: self.client.clone(),
            policy: self.policy.clone(),
            kind,
        })
    }

    /// Replace the current document, dropping the previous one first,
    /// and republish the scene. Returns the number of scene nodes added.
    pub fn install(&mut self, document: Document) -> usize {
        if let Some(previous) = self.document.take() {
            tracing::debug!(objects = previous.len(), "Discarding previous document");
            drop(previous);
        }
        let added = self.scene.republish(&document);
        self.document = Some(document);
        self.installed += 1;
        added
    }

    /// Prepare, run and install in one go. On failure the current document
    /// and scene are left untouched.
    pub async fn evaluate(&mut self, params: &[(String, ParamValue)]) -> Result<&Document, EvaluationError> {
        let job = self.prepare(params)?;
        match job.run().await {
            Ok(document) => {
                self.install(document);
                Ok(self.document.get_or_insert_with(Document::new))
            }
            Err(e) => {
                tracing::error!("Evaluation failed: {e}");
                Err(e)
            }
        }
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    /// Number of documents installed so far
    pub fn installed_count(&self) -> u64 {
        self.installed
    }
}
