use mapblock_shared::config::{parse_attributes, BlockAttributes};
use mapblock_shared::models::{MapboxDefaults, MarkerIcon};
use serde::{Deserialize, Serialize};

/// Build the variables JSON for a create block mutation.
pub fn build_create_block_variables(name: &str, attributes: &BlockAttributes) -> serde_json::Value {
    serde_json::json!({
        "input": {
            "name": name,
            "attributes": attributes.to_json(),
        }
    })
}

/// Build the variables JSON for an update block mutation. Only the given
/// parts are sent; the server keeps the rest.
pub fn build_update_block_variables(
    id: &str,
    name: Option<&str>,
    attributes: Option<&BlockAttributes>,
) -> serde_json::Value {
    let mut input = serde_json::json!({ "id": id });
    if let Some(name) = name {
        input["name"] = serde_json::json!(name);
    }
    if let Some(attributes) = attributes {
        input["attributes"] = serde_json::json!(attributes.to_json());
    }
    serde_json::json!({ "input": input })
}

/// Path of the editor for a block.
pub fn build_editor_path(block_id: &str) -> String {
    format!("/edit/{}", block_id)
}

/// Public page URL of a block.
pub fn build_block_url(origin: &str, block_id: &str) -> String {
    format!("{}/block/{}", origin, block_id)
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphQLRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLError {
    pub message: String,
}

pub fn origin() -> Option<String> {
    web_sys::window()?.location().origin().ok()
}

async fn query<T: for<'de> Deserialize<'de>>(
    query_str: &str,
    variables: Option<serde_json::Value>,
) -> Result<T, String> {
    let origin = origin().ok_or_else(|| "no window origin".to_string())?;
    let req = GraphQLRequest {
        query: query_str.to_string(),
        variables,
    };

    let resp = reqwest::Client::new()
        .post(format!("{}/graphql", origin))
        .json(&req)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let gql_resp: GraphQLResponse<T> = resp.json().await.map_err(|e| e.to_string())?;

    if let Some(errors) = gql_resp.errors {
        if let Some(first) = errors.into_iter().next() {
            return Err(first.message);
        }
    }

    gql_resp.data.ok_or_else(|| "No data returned".to_string())
}

// Types mirroring the GraphQL schema

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultsData {
    pub access_token: Option<String>,
    pub site_url: String,
    pub language: String,
}

impl From<DefaultsData> for MapboxDefaults {
    fn from(d: DefaultsData) -> Self {
        MapboxDefaults {
            access_token: d.access_token,
            site_url: d.site_url,
            language: d.language,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockData {
    pub id: String,
    pub name: String,
    /// The attribute document as JSON text.
    pub attributes: String,
    pub listing_count: u32,
    pub created_at: String,
    pub updated_at: String,
}

impl BlockData {
    /// Parsed attributes; broken fields fall back to their defaults.
    pub fn block_attributes(&self) -> BlockAttributes {
        parse_attributes(&self.attributes)
    }
}

const BLOCK_FIELDS: &str = "id name attributes listingCount createdAt updatedAt";

// API functions

#[derive(Deserialize)]
pub struct DefaultsResponse {
    pub defaults: DefaultsData,
}

pub async fn fetch_defaults() -> Result<MapboxDefaults, String> {
    let resp: DefaultsResponse =
        query(r#"query { defaults { accessToken siteUrl language } }"#, None).await?;
    Ok(resp.defaults.into())
}

#[derive(Deserialize)]
pub struct IconsResponse {
    pub icons: Vec<MarkerIcon>,
}

pub async fn fetch_icons() -> Result<Vec<MarkerIcon>, String> {
    let resp: IconsResponse = query(r#"query { icons { id name content } }"#, None).await?;
    Ok(resp.icons)
}

#[derive(Deserialize)]
pub struct BlocksResponse {
    pub blocks: Vec<BlockData>,
}

pub async fn fetch_blocks() -> Result<Vec<BlockData>, String> {
    let resp: BlocksResponse = query(&format!("query {{ blocks {{ {} }} }}", BLOCK_FIELDS), None).await?;
    Ok(resp.blocks)
}

#[derive(Deserialize)]
pub struct FetchBlockResponse {
    pub block: Option<BlockData>,
}

pub async fn fetch_block(id: &str) -> Result<Option<BlockData>, String> {
    let variables = serde_json::json!({ "id": id });
    let resp: FetchBlockResponse = query(
        &format!("query FetchBlock($id: ID!) {{ block(id: $id) {{ {} }} }}", BLOCK_FIELDS),
        Some(variables),
    )
    .await?;
    Ok(resp.block)
}

#[derive(Deserialize)]
pub struct CreateBlockResponse {
    #[serde(rename = "createBlock")]
    pub create_block: BlockData,
}

pub async fn create_block(name: &str, attributes: &BlockAttributes) -> Result<BlockData, String> {
    let resp: CreateBlockResponse = query(
        &format!(
            "mutation CreateBlock($input: CreateBlockInput!) {{ createBlock(input: $input) {{ {} }} }}",
            BLOCK_FIELDS
        ),
        Some(build_create_block_variables(name, attributes)),
    )
    .await?;
    Ok(resp.create_block)
}

#[derive(Deserialize)]
pub struct UpdateBlockResponse {
    #[serde(rename = "updateBlock")]
    pub update_block: BlockData,
}

pub async fn update_block(
    id: &str,
    name: Option<&str>,
    attributes: Option<&BlockAttributes>,
) -> Result<BlockData, String> {
    let resp: UpdateBlockResponse = query(
        &format!(
            "mutation UpdateBlock($input: UpdateBlockInput!) {{ updateBlock(input: $input) {{ {} }} }}",
            BLOCK_FIELDS
        ),
        Some(build_update_block_variables(id, name, attributes)),
    )
    .await?;
    Ok(resp.update_block)
}

#[derive(Deserialize)]
pub struct DeleteBlockResponse {
    #[serde(rename = "deleteBlock")]
    pub delete_block: bool,
}

pub async fn delete_block(id: &str) -> Result<bool, String> {
    let variables = serde_json::json!({ "id": id });
    let resp: DeleteBlockResponse = query(
        r#"mutation DeleteBlock($id: ID!) { deleteBlock(id: $id) }"#,
        Some(variables),
    )
    .await?;
    Ok(resp.delete_block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapblock_shared::models::{Listing, LngLat};

    // --- GraphQL request serialization ---

    #[test]
    fn test_graphql_request_serializes_with_variables() {
        let req = GraphQLRequest {
            query: "query { blocks { name } }".to_string(),
            variables: Some(serde_json::json!({"id": "abc"})),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["query"], "query { blocks { name } }");
        assert_eq!(json["variables"]["id"], "abc");
    }

    #[test]
    fn test_graphql_request_omits_null_variables() {
        let req = GraphQLRequest {
            query: "query { icons { name } }".to_string(),
            variables: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("variables").is_none());
    }

    // --- Variable builders ---

    #[test]
    fn test_create_variables_carry_attributes_as_text() {
        let mut attrs = BlockAttributes::default();
        attrs
            .mapbox_options
            .listings
            .push(Listing::new_at(0, LngLat::new(9.0, 45.0)));
        let vars = build_create_block_variables("Shops", &attrs);
        assert_eq!(vars["input"]["name"], "Shops");
        let text = vars["input"]["attributes"].as_str().unwrap();
        assert_eq!(parse_attributes(text), attrs);
    }

    #[test]
    fn test_update_variables_only_send_given_parts() {
        let vars = build_update_block_variables("id-1", Some("Cafes"), None);
        assert_eq!(vars["input"]["id"], "id-1");
        assert_eq!(vars["input"]["name"], "Cafes");
        assert!(vars["input"].get("attributes").is_none());

        let vars = build_update_block_variables("id-1", None, Some(&BlockAttributes::default()));
        assert!(vars["input"].get("name").is_none());
        assert!(vars["input"]["attributes"].is_string());
    }

    #[test]
    fn test_paths() {
        assert_eq!(build_editor_path("b1"), "/edit/b1");
        assert_eq!(build_block_url("https://maps.example.org", "b1"), "https://maps.example.org/block/b1");
    }

    // --- Response deserialization ---

    #[test]
    fn test_defaults_response_deserializes() {
        let json = r#"{"defaults":{"accessToken":null,"siteUrl":"http://localhost:3000","language":"en"}}"#;
        let resp: DefaultsResponse = serde_json::from_str(json).unwrap();
        let defaults: MapboxDefaults = resp.defaults.into();
        assert!(defaults.credential().is_none());
        assert_eq!(defaults.language, "en");
    }

    #[test]
    fn test_icons_response_deserializes() {
        let json = r#"{"icons":[{"id":0,"name":"default","content":"<svg/>"}]}"#;
        let resp: IconsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.icons.len(), 1);
        assert_eq!(resp.icons[0].name, "default");
    }

    #[test]
    fn test_block_response_deserializes() {
        let json = r#"{"block":{"id":"b1","name":"Shops","attributes":"{\"mapZoom\":4}","listingCount":0,"createdAt":"t0","updatedAt":"t1"}}"#;
        let resp: FetchBlockResponse = serde_json::from_str(json).unwrap();
        let block = resp.block.unwrap();
        assert_eq!(block.name, "Shops");
        assert_eq!(block.block_attributes().map_zoom, 4.0);
    }

    #[test]
    fn test_missing_block_deserializes_to_none() {
        let resp: FetchBlockResponse = serde_json::from_str(r#"{"block":null}"#).unwrap();
        assert!(resp.block.is_none());
    }

    #[test]
    fn test_graphql_error_response() {
        let json = r#"{"data":null,"errors":[{"message":"Block not found"}]}"#;
        let resp: GraphQLResponse<UpdateBlockResponse> = serde_json::from_str(json).unwrap();
        assert!(resp.data.is_none());
        assert_eq!(resp.errors.unwrap()[0].message, "Block not found");
    }
}
