use crate::commands::gateway::CivicGateway;
use crate::interaction::filter::Selector;
use crate::interaction::views::{collection_view, detail_view, ListScope, ReportCollectionView, ReportDetailView};
use crate::models::board::{status_counts, ReportBoard, StatusCounts};
use crate::models::report::Vote;
use crate::models::tally::VoteTally;
use std::sync::{Arc, Mutex};

pub type SharedBoard = Arc<Mutex<ReportBoard>>;
pub type SharedGateway = Arc<dyn CivicGateway>;

const BOARD_LOCK_ERROR: &str = "Board lock error";

pub async fn reload_reports_internal(
    board: &SharedBoard,
    gateway: &dyn CivicGateway,
) -> Result<usize, String> {
    let community = gateway
        .fetch_reports(false)
        .await
        .map_err(|e| e.to_string())?;
    let mine = gateway
        .fetch_reports(true)
        .await
        .map_err(|e| e.to_string())?;
    let loaded = community.len() + mine.len();

    let mut board = board.lock().map_err(|_| BOARD_LOCK_ERROR.to_string())?;
    board.replace(community, mine);
    log::debug!("board loaded with {loaded} reports");

    Ok(loaded)
}

async fn ensure_loaded(board: &SharedBoard, gateway: &dyn CivicGateway) -> Result<(), String> {
    let loaded = board
        .lock()
        .map_err(|_| BOARD_LOCK_ERROR.to_string())?
        .loaded;
    if !loaded {
        reload_reports_internal(board, gateway).await?;
    }
    Ok(())
}

fn parse_selector(raw: Option<&str>) -> Result<Selector, String> {
    match raw {
        Some(raw) => Selector::parse(raw).map_err(|e| e.to_string()),
        None => Ok(Selector::All),
    }
}

pub async fn list_reports_internal(
    board: &SharedBoard,
    gateway: &dyn CivicGateway,
    query: &str,
    selector: Option<&str>,
) -> Result<ReportCollectionView, String> {
    let selector = parse_selector(selector)?;
    ensure_loaded(board, gateway).await?;

    let board = board.lock().map_err(|_| BOARD_LOCK_ERROR.to_string())?;
    Ok(collection_view(ListScope::Community, &board.community, query, selector))
}

pub async fn list_my_reports_internal(
    board: &SharedBoard,
    gateway: &dyn CivicGateway,
    selector: Option<&str>,
) -> Result<ReportCollectionView, String> {
    let selector = parse_selector(selector)?;
    ensure_loaded(board, gateway).await?;

    let board = board.lock().map_err(|_| BOARD_LOCK_ERROR.to_string())?;
    Ok(collection_view(ListScope::Mine, &board.mine, "", selector))
}

pub async fn get_status_counts_internal(
    board: &SharedBoard,
    gateway: &dyn CivicGateway,
) -> Result<StatusCounts, String> {
    ensure_loaded(board, gateway).await?;
    let board = board.lock().map_err(|_| BOARD_LOCK_ERROR.to_string())?;
    Ok(status_counts(&board.mine))
}

pub async fn get_report_detail_internal(
    board: &SharedBoard,
    gateway: &dyn CivicGateway,
    id: &str,
) -> Result<ReportDetailView, String> {
    ensure_loaded(board, gateway).await?;
    let detail = gateway.fetch_detail(id).await.map_err(|e| e.to_string())?;

    let board = board.lock().map_err(|_| BOARD_LOCK_ERROR.to_string())?;
    let tally = board
        .find(id)
        .map(VoteTally::of)
        .unwrap_or_else(|| VoteTally::of(&detail.report));

    Ok(detail_view(&detail, tally))
}

// Votes stay on the board and are never sent to the gateway.
pub fn cast_vote_internal(board: &SharedBoard, id: &str, direction: &str) -> Result<VoteTally, String> {
    let direction =
        Vote::from_name(direction).ok_or_else(|| format!("Unknown vote direction: {direction}"))?;

    let mut board = board.lock().map_err(|_| BOARD_LOCK_ERROR.to_string())?;
    let tally = board
        .cast_vote(id, direction)
        .ok_or_else(|| format!("Report not found: {id}"))?;

    log::debug!(
        "vote {} on {id}: {}/{} ({:?})",
        direction.as_str(),
        tally.upvotes,
        tally.downvotes,
        tally.user_vote
    );
    Ok(tally)
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub async fn reload_reports(
    board: tauri::State<'_, SharedBoard>,
    gateway: tauri::State<'_, SharedGateway>,
) -> Result<usize, String> {
    reload_reports_internal(board.inner(), gateway.inner().as_ref()).await
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub async fn list_reports(
    query: String,
    selector: Option<String>,
    board: tauri::State<'_, SharedBoard>,
    gateway: tauri::State<'_, SharedGateway>,
) -> Result<ReportCollectionView, String> {
    list_reports_internal(board.inner(), gateway.inner().as_ref(), &query, selector.as_deref()).await
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub async fn list_my_reports(
    selector: Option<String>,
    board: tauri::State<'_, SharedBoard>,
    gateway: tauri::State<'_, SharedGateway>,
) -> Result<ReportCollectionView, String> {
    list_my_reports_internal(board.inner(), gateway.inner().as_ref(), selector.as_deref()).await
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub async fn get_status_counts(
    board: tauri::State<'_, SharedBoard>,
    gateway: tauri::State<'_, SharedGateway>,
) -> Result<StatusCounts, String> {
    get_status_counts_internal(board.inner(), gateway.inner().as_ref()).await
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub async fn get_report_detail(
    id: String,
    board: tauri::State<'_, SharedBoard>,
    gateway: tauri::State<'_, SharedGateway>,
) -> Result<ReportDetailView, String> {
    get_report_detail_internal(board.inner(), gateway.inner().as_ref(), &id).await
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub fn cast_vote(
    id: String,
    direction: String,
    board: tauri::State<'_, SharedBoard>,
) -> Result<VoteTally, String> {
    cast_vote_internal(board.inner(), &id, &direction)
}
