//! GraphQL read surface over the catalog.
//!
//! A thin alternative to the REST listings for clients that want to
//! pick fields. Queries only; all mutations stay on the REST surface.

use async_graphql::{Context, EmptyMutation, EmptySubscription, Object, Schema, SimpleObject};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::State;
use rust_decimal::Decimal;

use crate::db::{ArtworkRepository, CategoryRepository};
use crate::models::{ArtworkFilter, ArtworkSummary, Category, SortOrder};
use crate::routes::catalog::enrich_artworks;
use crate::state::AppState;

/// The catalog schema: queries only.
pub type CatalogSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

/// Build the schema with the application state in its context.
pub fn build_schema(state: AppState) -> CatalogSchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(state)
        .finish()
}

/// Handle a GraphQL request.
///
/// POST /graphql
pub async fn graphql_handler(
    State(schema): State<CatalogSchema>,
    request: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(request.into_inner()).await.into()
}

/// A catalog category.
#[derive(SimpleObject)]
pub struct GqlCategory {
    pub id: i32,
    pub name: String,
}

impl From<Category> for GqlCategory {
    fn from(category: Category) -> Self {
        Self {
            id: category.id.as_i32(),
            name: category.name,
        }
    }
}

/// An artwork with its enrichment, as exposed over GraphQL.
#[derive(SimpleObject)]
pub struct GqlArtwork {
    pub id: i32,
    pub title: String,
    pub artist_name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub category_id: Option<i32>,
    pub category_name: Option<String>,
    pub description: Option<String>,
    pub thumbnail: String,
    pub tags: Vec<String>,
}

impl From<ArtworkSummary> for GqlArtwork {
    fn from(summary: ArtworkSummary) -> Self {
        Self {
            id: summary.id.as_i32(),
            title: summary.title,
            artist_name: summary.artist_name,
            price: summary.price.amount(),
            quantity: summary.quantity,
            category_id: summary.category_id.map(|id| id.as_i32()),
            category_name: summary.category_name,
            description: summary.description,
            thumbnail: summary.thumbnail,
            tags: summary.tags,
        }
    }
}

/// Root query object.
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// All categories.
    async fn categories(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<GqlCategory>> {
        let state = ctx.data::<AppState>()?;
        let rows = CategoryRepository::new(state.pool()).list().await?;
        Ok(rows.into_iter().map(GqlCategory::from).collect())
    }

    /// Search the catalog with the same filters as `GET /search_artworks`.
    #[allow(clippy::too_many_arguments)]
    async fn search_artworks(
        &self,
        ctx: &Context<'_>,
        min: Option<Decimal>,
        max: Option<Decimal>,
        title: Option<String>,
        artist_name: Option<String>,
        category_id: Option<i32>,
        #[graphql(default = false)] only_featured: bool,
        ascending: Option<bool>,
        n: Option<i64>,
        offset: Option<i64>,
    ) -> async_graphql::Result<Vec<GqlArtwork>> {
        let state = ctx.data::<AppState>()?;

        let filter = ArtworkFilter {
            min,
            max,
            title,
            artist_name,
            category_id: category_id.map(atelier_core::CategoryId::new),
            only_featured,
            order: ascending.map(|asc| if asc { SortOrder::Asc } else { SortOrder::Desc }),
            n,
            offset,
        };

        let rows = ArtworkRepository::new(state.pool()).search(&filter).await?;
        let enriched = enrich_artworks(state, rows).await?;
        Ok(enriched.into_iter().map(GqlArtwork::from).collect())
    }
}
