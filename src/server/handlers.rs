use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, MutexGuard};
use tracing::warn;

use crate::catalog::{
    dashboard_stats, filter, proposals_by_model, sales_by_make, search_dealers, search_proposals,
    search_vehicles, ChartPoint, DashboardStats, Dealer, Facets, FilterError, FilterQuery,
    Proposal, ProposalStatus, Vehicle, ALL,
};
use crate::location::{CascadeError, LocationTree, Selection, SelectionStage};
use crate::store::{DealerForm, ProposalDetail, ProposalForm, Store, StoreError, VehicleForm};

use super::state::AppState;

/// Listings per page on the storefront grid.
pub const PAGE_SIZE: usize = 6;
const MAX_PAGE_SIZE: usize = 100;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

#[derive(Debug)]
pub struct ApiError(StatusCode, String);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.0
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        let status = match e {
            StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            StoreError::Invalid { .. } | StoreError::Location(_) => StatusCode::BAD_REQUEST,
            StoreError::VehicleSold(_) | StoreError::DealerInUse { .. } => StatusCode::CONFLICT,
            StoreError::IdsExhausted(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        api_error(status, e.to_string())
    }
}

impl From<FilterError> for ApiError {
    fn from(e: FilterError) -> Self {
        api_error(StatusCode::BAD_REQUEST, e.to_string())
    }
}

impl From<CascadeError> for ApiError {
    fn from(e: CascadeError) -> Self {
        api_error(StatusCode::CONFLICT, e.to_string())
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn lock_store(state: &AppState) -> ApiResult<MutexGuard<'_, Store>> {
    state.store().ok_or_else(|| {
        warn!("store lock poisoned");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "store unavailable")
    })
}

// ─── GET /api/vehicles ───────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub offset: Option<usize>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub limit: Option<usize>,
}

/// Empty query values (`offset=`) count as absent.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v.parse().map(Some).map_err(de::Error::custom),
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    fn slice(all: Vec<T>, page: &PageQuery) -> Self {
        let total = all.len();
        let offset = page.offset.unwrap_or(0);
        let limit = page.limit.unwrap_or(PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let items = all.into_iter().skip(offset).take(limit).collect();
        Self { total, offset, limit, items }
    }
}

pub async fn list_vehicles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilterQuery>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Page<Vehicle>>> {
    let spec = query.into_spec()?;
    let store = lock_store(&state)?;
    let matched = filter(store.vehicles(), &spec);
    Ok(Json(Page::slice(matched, &page)))
}

// ─── GET /api/vehicles/{id} ──────────────────────────────────────

pub async fn get_vehicle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vehicle>> {
    let store = lock_store(&state)?;
    Ok(Json(store.vehicle(&id)?.clone()))
}

// ─── GET /api/facets ─────────────────────────────────────────────

pub async fn facets(State(state): State<Arc<AppState>>) -> ApiResult<Json<Facets>> {
    let store = lock_store(&state)?;
    Ok(Json(Facets::from_vehicles(store.vehicles())))
}

// ─── Locations ───────────────────────────────────────────────────

pub async fn locations(State(state): State<Arc<AppState>>) -> Json<LocationTree> {
    Json(state.resolver.tree().clone())
}

/// Unknown states yield an empty list, not an error.
pub async fn cities(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Json<Vec<String>> {
    Json(to_owned(state.resolver.cities_for(&code)))
}

pub async fn regions(
    State(state): State<Arc<AppState>>,
    Path((code, city)): Path<(String, String)>,
) -> Json<Vec<String>> {
    Json(to_owned(state.resolver.regions_for(&code, &city)))
}

fn to_owned(names: Vec<&str>) -> Vec<String> {
    names.into_iter().map(str::to_string).collect()
}

// ─── POST /api/selection ─────────────────────────────────────────

/// One cascade step, e.g. `{"city": "Campinas"}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionChange {
    State(String),
    City(String),
    Region(String),
}

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    #[serde(default)]
    pub selection: Selection,
    pub set: SelectionChange,
}

/// The new selection plus the options for the next select down.
#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub selection: Selection,
    pub stage: SelectionStage,
    pub cities: Vec<String>,
    pub regions: Vec<String>,
}

pub async fn update_selection(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectionRequest>,
) -> ApiResult<Json<SelectionResponse>> {
    let r = &state.resolver;
    let selection = match &req.set {
        SelectionChange::State(code) => r.set_state(&req.selection, code)?,
        SelectionChange::City(city) => r.set_city(&req.selection, city)?,
        SelectionChange::Region(region) => r.set_region(&req.selection, region)?,
    };
    Ok(Json(SelectionResponse {
        stage: selection.stage(),
        cities: to_owned(r.cities_for(&selection.state)),
        regions: to_owned(r.regions_for(&selection.state, &selection.city)),
        selection,
    }))
}

// ─── POST /api/proposals ─────────────────────────────────────────

pub async fn submit_proposal(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ProposalForm>,
) -> ApiResult<(StatusCode, Json<Proposal>)> {
    let mut store = lock_store(&state)?;
    let proposal = store.submit_proposal(form)?;
    Ok((StatusCode::CREATED, Json(proposal)))
}

// ─── GET /api/admin/stats ────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    #[serde(flatten)]
    pub dashboard: DashboardStats,
    pub sales_by_make: Vec<ChartPoint>,
    pub proposals_by_model: Vec<ChartPoint>,
}

pub async fn admin_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<AdminStats>> {
    let store = lock_store(&state)?;
    Ok(Json(AdminStats {
        dashboard: dashboard_stats(store.vehicles(), store.proposals()),
        sales_by_make: sales_by_make(store.vehicles()),
        proposals_by_model: proposals_by_model(store.vehicles(), store.proposals()),
    }))
}

// ─── Admin: vehicles ─────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

impl SearchQuery {
    fn term(&self) -> &str {
        self.q.as_deref().unwrap_or("")
    }
}

pub async fn admin_vehicles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Vehicle>>> {
    let store = lock_store(&state)?;
    Ok(Json(search_vehicles(store.vehicles(), query.term())))
}

pub async fn create_vehicle(
    State(state): State<Arc<AppState>>,
    Json(form): Json<VehicleForm>,
) -> ApiResult<(StatusCode, Json<Vehicle>)> {
    let mut store = lock_store(&state)?;
    Ok((StatusCode::CREATED, Json(store.create_vehicle(form)?)))
}

pub async fn update_vehicle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(form): Json<VehicleForm>,
) -> ApiResult<Json<Vehicle>> {
    let mut store = lock_store(&state)?;
    Ok(Json(store.update_vehicle(&id, form)?))
}

pub async fn delete_vehicle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let mut store = lock_store(&state)?;
    store.delete_vehicle(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Admin: dealers ──────────────────────────────────────────────

pub async fn admin_dealers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Dealer>>> {
    let store = lock_store(&state)?;
    Ok(Json(search_dealers(store.dealers(), query.term())))
}

pub async fn create_dealer(
    State(state): State<Arc<AppState>>,
    Json(form): Json<DealerForm>,
) -> ApiResult<(StatusCode, Json<Dealer>)> {
    let mut store = lock_store(&state)?;
    Ok((StatusCode::CREATED, Json(store.create_dealer(form)?)))
}

pub async fn update_dealer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(form): Json<DealerForm>,
) -> ApiResult<Json<Dealer>> {
    let mut store = lock_store(&state)?;
    Ok(Json(store.update_dealer(&id, form)?))
}

pub async fn delete_dealer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let mut store = lock_store(&state)?;
    store.delete_dealer(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Admin: proposals ────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ProposalQuery {
    pub q: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: ProposalStatus,
}

fn parse_status(s: Option<&str>) -> ApiResult<Option<ProposalStatus>> {
    match s.map(str::trim) {
        None | Some("") | Some(ALL) => Ok(None),
        Some(other) => other.parse().map(Some).map_err(|_| {
            api_error(
                StatusCode::BAD_REQUEST,
                format!("Unknown status '{}'. Use pending, contacted, accepted or rejected.", other),
            )
        }),
    }
}

pub async fn admin_proposals(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProposalQuery>,
) -> ApiResult<Json<Vec<Proposal>>> {
    let status = parse_status(query.status.as_deref())?;
    let store = lock_store(&state)?;
    let term = query.q.as_deref().unwrap_or("");
    Ok(Json(search_proposals(store.proposals(), term, status)))
}

pub async fn get_proposal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProposalDetail>> {
    let store = lock_store(&state)?;
    Ok(Json(store.proposal_with_vehicle(&id)?))
}

pub async fn update_proposal_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> ApiResult<Json<Proposal>> {
    let mut store = lock_store(&state)?;
    Ok(Json(store.update_proposal_status(&id, update.status)?))
}

pub async fn delete_proposal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let mut store = lock_store(&state)?;
    store.delete_proposal(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::VehicleLocation;
    use crate::provider::{DataSource, Dataset};

    fn app() -> Arc<AppState> {
        Arc::new(AppState::new(Dataset::sample(), DataSource::Sample))
    }

    fn filter_query(f: impl FnOnce(&mut FilterQuery)) -> Query<FilterQuery> {
        let mut q = FilterQuery::default();
        f(&mut q);
        Query(q)
    }

    #[tokio::test]
    async fn test_list_vehicles_paginates() {
        let Json(page) = list_vehicles(State(app()), Query(FilterQuery::default()), Query(PageQuery::default()))
            .await
            .unwrap();
        assert_eq!(page.total, 6);
        assert_eq!(page.limit, PAGE_SIZE);
        assert_eq!(page.items.len(), 6);

        let Json(page) = list_vehicles(
            State(app()),
            Query(FilterQuery::default()),
            Query(PageQuery { offset: Some(4), limit: Some(4) }),
        )
        .await
        .unwrap();
        assert_eq!(page.total, 6);
        let ids: Vec<_> = page.items.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["5", "6"]);
    }

    #[tokio::test]
    async fn test_list_vehicles_filters() {
        let query = filter_query(|q| {
            q.make = Some("Honda,Fiat".into());
            q.transmission = Some("automatic".into());
        });
        let Json(page) = list_vehicles(State(app()), query, Query(PageQuery::default()))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].model, "Civic");
    }

    fn query_from<T: serde::de::DeserializeOwned>(uri: &str) -> Query<T> {
        let uri: axum::http::Uri = uri.parse().unwrap();
        Query::try_from_uri(&uri).unwrap()
    }

    #[tokio::test]
    async fn test_list_vehicles_blank_form_fields() {
        let uri = "/api/vehicles?state=SP&priceMin=&priceMax=&yearMin=&make=&q=%20&offset=&limit=";
        let Json(page) = list_vehicles(State(app()), query_from(uri), query_from(uri))
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.limit, PAGE_SIZE);
        let ids: Vec<_> = page.items.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3", "5"]);
    }

    #[tokio::test]
    async fn test_list_vehicles_query_string_bounds() {
        let uri = "/api/vehicles?priceMin=70000&priceMax=90000&transmission=manual";
        let Json(page) = list_vehicles(State(app()), query_from(uri), query_from(uri))
            .await
            .unwrap();
        let ids: Vec<_> = page.items.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "4"]);

        let uri = "/api/vehicles?priceMin=cheap";
        let err = list_vehicles(State(app()), query_from(uri), query_from(uri))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_dealer_in_use_is_conflict() {
        let err = delete_dealer(State(app()), Path("2".into())).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_list_vehicles_bad_transmission() {
        let query = filter_query(|q| q.transmission = Some("cvt".into()));
        let err = list_vehicles(State(app()), query, Query(PageQuery::default()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_vehicle_not_found() {
        let err = get_vehicle(State(app()), Path("99".into())).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        let Json(v) = get_vehicle(State(app()), Path("4".into())).await.unwrap();
        assert_eq!(v.make, "Hyundai");
    }

    #[tokio::test]
    async fn test_location_lookups() {
        let Json(cities_sp) = cities(State(app()), Path("SP".into())).await;
        assert_eq!(cities_sp, vec!["São Paulo", "Campinas", "Santos"]);
        let Json(none) = cities(State(app()), Path("ZZ".into())).await;
        assert!(none.is_empty());
        let Json(rs) = regions(State(app()), Path(("RJ".into(), "Niterói".into()))).await;
        assert_eq!(rs, vec!["Centro", "Icaraí", "São Francisco", "Ingá"]);
    }

    #[tokio::test]
    async fn test_selection_state_change_clears_children() {
        let req = SelectionRequest {
            selection: Selection::new("SP", "Campinas", "Centro"),
            set: SelectionChange::State("RJ".into()),
        };
        let Json(resp) = update_selection(State(app()), Json(req)).await.unwrap();
        assert_eq!(resp.selection, Selection::new("RJ", "", ""));
        assert_eq!(resp.stage, SelectionStage::StateOnly);
        assert_eq!(resp.cities.len(), 3);
        assert!(resp.regions.is_empty());
    }

    #[tokio::test]
    async fn test_selection_rejected_is_conflict() {
        let req = SelectionRequest {
            selection: Selection::new("SP", "", ""),
            set: SelectionChange::City("Niterói".into()),
        };
        let err = update_selection(State(app()), Json(req)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_selection_request_wire_shape() {
        let req: SelectionRequest =
            serde_json::from_str(r#"{ "set": { "city": "Santos" } }"#).unwrap();
        assert_eq!(req.selection, Selection::default());
        assert!(matches!(req.set, SelectionChange::City(ref c) if c == "Santos"));
    }

    #[tokio::test]
    async fn test_submit_proposal_for_sold_vehicle() {
        let form = ProposalForm {
            vehicle_id: "3".into(),
            customer_name: "Rita".into(),
            customer_email: "rita@email.com".into(),
            customer_phone: "123".into(),
            message: String::new(),
        };
        let err = submit_proposal(State(app()), Json(form)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_admin_vehicle_lifecycle() {
        let state = app();
        let form = VehicleForm {
            make: "Renault".into(),
            model: "Kwid".into(),
            price: 59900,
            location: VehicleLocation {
                state: "MG".into(),
                city: "Uberlândia".into(),
                region: String::new(),
            },
            ..Default::default()
        };
        let (status, Json(created)) = create_vehicle(State(state.clone()), Json(form)).await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.id, "7");

        let Json(found) = admin_vehicles(State(state.clone()), Query(SearchQuery { q: Some("kwid".into()) }))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        let status = delete_vehicle(State(state.clone()), Path("7".into())).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        let err = delete_vehicle(State(state), Path("7".into())).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_dealer_invalid_email() {
        let form = DealerForm {
            name: "X".into(),
            email: "x-at-y".into(),
            phone: "1".into(),
            ..Default::default()
        };
        let err = create_dealer(State(app()), Json(form)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_proposals_status_filter() {
        let query = ProposalQuery { q: None, status: Some("accepted".into()) };
        let Json(ps) = admin_proposals(State(app()), Query(query)).await.unwrap();
        assert_eq!(ps.len(), 1);
        assert_eq!(ps[0].customer_name, "Lucas Ferreira");

        let query = ProposalQuery { q: Some("email.com".into()), status: Some("all".into()) };
        let Json(ps) = admin_proposals(State(app()), Query(query)).await.unwrap();
        assert_eq!(ps.len(), 4);

        let query = ProposalQuery { q: None, status: Some("lost".into()) };
        let err = admin_proposals(State(app()), Query(query)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_proposal_status_update_and_detail() {
        let state = app();
        let update = StatusUpdate { status: ProposalStatus::Accepted };
        let Json(p) = update_proposal_status(State(state.clone()), Path("1".into()), Json(update))
            .await
            .unwrap();
        assert_eq!(p.status, ProposalStatus::Accepted);

        let Json(detail) = get_proposal(State(state), Path("1".into())).await.unwrap();
        assert_eq!(detail.proposal.status, ProposalStatus::Accepted);
        assert_eq!(detail.vehicle.map(|v| v.model).as_deref(), Some("Corolla"));
    }

    #[tokio::test]
    async fn test_admin_stats() {
        let Json(stats) = admin_stats(State(app())).await.unwrap();
        assert_eq!(stats.dashboard.total_vehicles, 6);
        assert_eq!(stats.dashboard.sold_vehicles, 1);
        assert_eq!(stats.sales_by_make, vec![ChartPoint { name: "Volkswagen".into(), value: 1 }]);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalProposals"], 4);
        assert!(json["proposalsByModel"].is_array());
    }
}
