use std::sync::Arc;

use async_graphql::{Context, InputObject, Object, SimpleObject, ID};
use mapblock_shared::{
    config::BlockAttributes,
    models::{self, MapboxDefaults},
};

use crate::assets::Assets;
use crate::storage::Storage;

// GraphQL output types

#[derive(SimpleObject)]
pub struct GqlDefaults {
    pub access_token: Option<String>,
    pub site_url: String,
    pub language: String,
}

impl From<&MapboxDefaults> for GqlDefaults {
    fn from(d: &MapboxDefaults) -> Self {
        GqlDefaults {
            access_token: d.credential().map(str::to_string),
            site_url: d.site_url.clone(),
            language: d.language.clone(),
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlIcon {
    pub id: u32,
    pub name: String,
    pub content: String,
}

#[derive(SimpleObject)]
pub struct GqlBlock {
    pub id: ID,
    pub name: String,
    /// The block attributes as a JSON document.
    pub attributes: String,
    pub listing_count: u32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<models::BlockRecord> for GqlBlock {
    fn from(b: models::BlockRecord) -> Self {
        GqlBlock {
            id: ID(b.id.to_string()),
            name: b.name,
            listing_count: b.attributes.mapbox_options.listings.len() as u32,
            attributes: b.attributes.to_json(),
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlStats {
    pub total_blocks: u64,
    pub db_size_bytes: u64,
}

// Input types

#[derive(InputObject)]
pub struct CreateBlockInput {
    pub name: String,
    pub attributes: Option<String>,
}

#[derive(InputObject)]
pub struct UpdateBlockInput {
    pub id: ID,
    pub name: Option<String>,
    pub attributes: Option<String>,
}

/// Attribute documents must be JSON; individual fields are then defaulted
/// leniently like any stored document.
fn parse_attributes_input(raw: &str) -> async_graphql::Result<BlockAttributes> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| async_graphql::Error::new(format!("attributes are not valid JSON: {}", e)))?;
    if !value.is_object() {
        return Err(async_graphql::Error::new("attributes must be a JSON object"));
    }
    Ok(BlockAttributes::from_value(&value))
}

// Query root

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn defaults(&self, ctx: &Context<'_>) -> async_graphql::Result<GqlDefaults> {
        let defaults = ctx.data::<Arc<MapboxDefaults>>()?;
        Ok(GqlDefaults::from(defaults.as_ref()))
    }

    async fn icons(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<GqlIcon>> {
        let assets = ctx.data::<Arc<Assets>>()?;
        Ok(assets
            .icons
            .iter()
            .map(|i| GqlIcon {
                id: i.id,
                name: i.name.clone(),
                content: i.content.clone(),
            })
            .collect())
    }

    async fn block(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<Option<GqlBlock>> {
        let storage = ctx.data::<Arc<Storage>>()?;
        let block = storage.get_block(&id)?;
        Ok(block.map(GqlBlock::from))
    }

    async fn blocks(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<GqlBlock>> {
        let storage = ctx.data::<Arc<Storage>>()?;
        Ok(storage
            .list_blocks()?
            .into_iter()
            .map(GqlBlock::from)
            .collect())
    }

    async fn stats(&self, ctx: &Context<'_>) -> async_graphql::Result<GqlStats> {
        let storage = ctx.data::<Arc<Storage>>()?;
        Ok(GqlStats {
            total_blocks: storage.count_blocks()?,
            db_size_bytes: storage.db_size_bytes()?,
        })
    }
}

// Mutation root

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_block(
        &self,
        ctx: &Context<'_>,
        input: CreateBlockInput,
    ) -> async_graphql::Result<GqlBlock> {
        let storage = ctx.data::<Arc<Storage>>()?;
        let now = chrono::Utc::now().to_rfc3339();

        let attributes = match input.attributes.as_deref() {
            Some(raw) => parse_attributes_input(raw)?,
            None => BlockAttributes::default(),
        };

        let block = models::BlockRecord {
            id: uuid::Uuid::new_v4(),
            name: input.name,
            attributes,
            created_at: now.clone(),
            updated_at: now,
        };

        storage.save_block(&block)?;
        tracing::info!(id = %block.id, "block created");

        Ok(GqlBlock::from(block))
    }

    async fn update_block(
        &self,
        ctx: &Context<'_>,
        input: UpdateBlockInput,
    ) -> async_graphql::Result<GqlBlock> {
        let storage = ctx.data::<Arc<Storage>>()?;

        let mut block = storage
            .get_block(&input.id)?
            .ok_or_else(|| async_graphql::Error::new("Block not found"))?;

        if let Some(name) = input.name {
            block.name = name;
        }
        if let Some(raw) = input.attributes.as_deref() {
            block.attributes = parse_attributes_input(raw)?;
        }

        block.updated_at = chrono::Utc::now().to_rfc3339();

        storage.save_block(&block)?;

        Ok(GqlBlock::from(block))
    }

    async fn delete_block(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<bool> {
        let storage = ctx.data::<Arc<Storage>>()?;
        Ok(storage.delete_block(&id)?)
    }
}

pub type Schema = async_graphql::Schema<QueryRoot, MutationRoot, async_graphql::EmptySubscription>;

pub fn build_schema(assets: Arc<Assets>, storage: Arc<Storage>, defaults: Arc<MapboxDefaults>) -> Schema {
    async_graphql::Schema::build(QueryRoot, MutationRoot, async_graphql::EmptySubscription)
        .data(assets)
        .data(storage)
        .data(defaults)
        .finish()
}
