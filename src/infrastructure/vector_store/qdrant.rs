use async_trait::async_trait;
use qdrant_client::qdrant::{
    point_id::PointIdOptions, value::Kind, vectors_config::Config as VectorsConfigKind,
    CollectionInfo, Condition, Distance, Filter, PointId, ScoredPoint, SearchPointsBuilder,
    Value,
};
use qdrant_client::Qdrant;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::marker::PhantomData;
use tracing::warn;

use crate::domain::{
    ports::VectorIndex, Document, DomainError, Embedding, MetadataFilter, ScoredDocument,
};

/// Payload key holding the indexed text. Every other key is metadata.
pub const TEXT_FIELD: &str = "text";

/// One Qdrant collection per corpus, read-only.
///
/// Collections are expected to use cosine distance; Qdrant reports the
/// similarity, which is converted to `1 - similarity`.
pub struct QdrantVectorIndex<M> {
    client: Qdrant,
    collection: String,
    _metadata: PhantomData<fn() -> M>,
}

impl<M> QdrantVectorIndex<M> {
    pub async fn connect(
        url: &str,
        api_key: Option<&str>,
        collection: &str,
    ) -> Result<Self, DomainError> {
        let mut builder = Qdrant::from_url(url);
        if let Some(key) = api_key {
            builder = builder.api_key(key);
        }
        let client = builder
            .build()
            .map_err(|e| DomainError::unavailable(e.to_string()))?;

        let index = Self {
            client,
            collection: collection.to_string(),
            _metadata: PhantomData,
        };

        index.ensure_collection().await?;

        Ok(index)
    }

    async fn ensure_collection(&self) -> Result<(), DomainError> {
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| DomainError::unavailable(e.to_string()))?;

        let exists = collections
            .collections
            .iter()
            .any(|c| c.name == self.collection);

        if !exists {
            return Err(DomainError::unavailable(format!(
                "collection {} does not exist",
                self.collection
            )));
        }

        let info = self
            .client
            .collection_info(&self.collection)
            .await
            .map_err(|e| DomainError::unavailable(e.to_string()))?;

        check_cosine(&self.collection, info.result.as_ref())
    }
}

#[async_trait]
impl<M> VectorIndex<M> for QdrantVectorIndex<M>
where
    M: DeserializeOwned + Send + Sync,
{
    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredDocument<M>>, DomainError> {
        let mut request =
            SearchPointsBuilder::new(&self.collection, query.as_slice().to_vec(), top_k as u64)
                .with_payload(true);
        if let Some(filter) = filter {
            request = request.filter(to_qdrant_filter(filter));
        }

        let response = self
            .client
            .search_points(request)
            .await
            .map_err(|e| DomainError::unavailable(e.to_string()))?;

        Ok(response
            .result
            .into_iter()
            .filter_map(|point| match decode_point(point) {
                Ok(doc) => Some(doc),
                Err(e) => {
                    warn!(collection = %self.collection, error = %e, "skipping undecodable point");
                    None
                }
            })
            .collect())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        self.client
            .health_check()
            .await
            .map_err(|e| DomainError::unavailable(e.to_string()))?;
        self.ensure_collection().await
    }
}

/// Scores are converted as `1 - similarity`, which is only a distance for
/// cosine collections.
fn check_cosine(collection: &str, info: Option<&CollectionInfo>) -> Result<(), DomainError> {
    let vectors = info
        .and_then(|info| info.config.as_ref())
        .and_then(|config| config.params.as_ref())
        .and_then(|params| params.vectors_config.as_ref())
        .and_then(|vectors| vectors.config.as_ref());

    match vectors {
        Some(VectorsConfigKind::Params(params)) if params.distance == Distance::Cosine as i32 => {
            Ok(())
        }
        Some(VectorsConfigKind::Params(params)) => Err(DomainError::unavailable(format!(
            "collection {collection} uses distance {}, expected cosine",
            Distance::try_from(params.distance)
                .map(|d| d.as_str_name())
                .unwrap_or("unknown")
        ))),
        Some(VectorsConfigKind::ParamsMap(_)) | None => {
            warn!(collection, "cannot verify vector distance, assuming cosine");
            Ok(())
        }
    }
}

fn to_qdrant_filter(filter: &MetadataFilter) -> Filter {
    Filter::must([Condition::matches(
        filter.field(),
        filter.value().to_string(),
    )])
}

fn decode_point<M: DeserializeOwned>(
    point: ScoredPoint,
) -> Result<ScoredDocument<M>, DomainError> {
    let id = point
        .id
        .and_then(point_id_to_string)
        .ok_or_else(|| DomainError::internal("point without id"))?;

    let mut fields = payload_to_json(point.payload);
    let text = match fields.remove(TEXT_FIELD) {
        Some(serde_json::Value::String(text)) => text,
        _ => return Err(DomainError::internal(format!("point {id} has no text"))),
    };
    let metadata: M = serde_json::from_value(serde_json::Value::Object(fields))
        .map_err(|e| DomainError::internal(format!("point {id}: {e}")))?;

    Ok(ScoredDocument::new(
        Document::new(id, text, metadata),
        Some(1.0 - point.score),
    ))
}

fn point_id_to_string(id: PointId) -> Option<String> {
    match id.point_id_options? {
        PointIdOptions::Num(n) => Some(n.to_string()),
        PointIdOptions::Uuid(uuid) => Some(uuid),
    }
}

fn payload_to_json(
    payload: HashMap<String, Value>,
) -> serde_json::Map<String, serde_json::Value> {
    payload
        .into_iter()
        .map(|(key, value)| (key, value_to_json(value)))
        .collect()
}

fn value_to_json(value: Value) -> serde_json::Value {
    match value.kind {
        None | Some(Kind::NullValue(_)) => serde_json::Value::Null,
        Some(Kind::BoolValue(b)) => serde_json::Value::Bool(b),
        Some(Kind::IntegerValue(i)) => serde_json::Value::from(i),
        Some(Kind::DoubleValue(d)) => serde_json::Number::from_f64(d)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Some(Kind::StringValue(s)) => serde_json::Value::String(s),
        Some(Kind::ListValue(list)) => {
            serde_json::Value::Array(list.values.into_iter().map(value_to_json).collect())
        }
        Some(Kind::StructValue(st)) => serde_json::Value::Object(payload_to_json(st.fields)),
    }
}
