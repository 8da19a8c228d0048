use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer, Result};
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::config::SeatingConfig;
use crate::parser::{load_families_from_reader, unique_families};
use crate::pipeline::plan_families;
use crate::report::{conflict_records, table_sizes, AreasDocument};
use crate::seating::SeatingPlan;

// The latest plan lives in memory until the next upload
pub struct AppState {
    pub plan: Mutex<Option<SeatingPlan>>,
    pub config: SeatingConfig,
    pub admin_password: String,
}

impl AppState {
    pub fn new(config: SeatingConfig, admin_password: String) -> Self {
        Self {
            plan: Mutex::new(None),
            config,
            admin_password,
        }
    }

    fn plan(&self) -> Result<MutexGuard<'_, Option<SeatingPlan>>> {
        self.plan
            .lock()
            .map_err(|_| actix_web::error::ErrorInternalServerError("seating state unavailable"))
    }
}

fn no_plan() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({"error": "No seating plan loaded"}))
}

// Admin CSV upload endpoint
async fn admin_upload(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let password = req
        .headers()
        .get("X-Admin-Password")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if password != state.admin_password {
        warn!("rejected upload with bad admin password");
        return Ok(HttpResponse::Unauthorized().json(serde_json::json!({"success": false, "error": "Unauthorized"})));
    }

    match load_families_from_reader(body.as_ref()) {
        Ok(families) => {
            let families = unique_families(families);
            let plan = plan_families(&families, &state.config);
            let summary = serde_json::json!({
                "success": true,
                "message": "Seating plan generated successfully",
                "families": families.len(),
                "areas": plan.areas.len(),
                "tables": plan.table_count(),
                "conflicts": plan.conflicts.len(),
            });
            info!(families = families.len(), tables = plan.table_count(), "plan generated from upload");

            *state.plan()? = Some(plan);
            Ok(HttpResponse::Ok().json(summary))
        }
        Err(e) => Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": format!("Failed to process CSV: {}", e)
        }))),
    }
}

async fn get_layout(state: web::Data<AppState>) -> Result<HttpResponse> {
    let plan = state.plan()?;
    match *plan {
        Some(ref plan) => Ok(HttpResponse::Ok().json(AreasDocument::from_areas(&plan.areas))),
        None => Ok(no_plan()),
    }
}

async fn get_layout_text(state: web::Data<AppState>) -> Result<HttpResponse> {
    let plan = state.plan()?;
    match *plan {
        Some(ref plan) => Ok(HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .body(plan.layout.clone())),
        None => Ok(no_plan()),
    }
}

async fn get_conflicts(state: web::Data<AppState>) -> Result<HttpResponse> {
    let plan = state.plan()?;
    match *plan {
        Some(ref plan) => Ok(HttpResponse::Ok().json(conflict_records(&plan.conflicts))),
        None => Ok(no_plan()),
    }
}

async fn get_sizes(state: web::Data<AppState>) -> Result<HttpResponse> {
    let plan = state.plan()?;
    match *plan {
        Some(ref plan) => Ok(HttpResponse::Ok().json(table_sizes(&AreasDocument::from_areas(&plan.areas)))),
        None => Ok(no_plan()),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/upload", web::post().to(admin_upload))
        .route("/api/layout", web::get().to(get_layout))
        .route("/api/layout/text", web::get().to(get_layout_text))
        .route("/api/conflicts", web::get().to(get_conflicts))
        .route("/api/sizes", web::get().to(get_sizes));
}

pub async fn start_server(port: u16, admin_password: String, config: SeatingConfig) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new(config, admin_password));

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(web::PayloadConfig::new(16 * 1024 * 1024))
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;

    use crate::parser::tests::sample_csv;

    fn state() -> web::Data<AppState> {
        web::Data::new(AppState::new(SeatingConfig::default(), "secret".to_string()))
    }

    #[actix_web::test]
    async fn test_no_plan_is_not_found() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        for uri in ["/api/layout", "/api/layout/text", "/api/conflicts", "/api/sizes"] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
        }
    }

    #[actix_web::test]
    async fn test_upload_requires_password() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/upload")
            .insert_header(("X-Admin-Password", "wrong"))
            .set_payload(sample_csv())
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_upload_then_read_layout() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/upload")
            .insert_header(("X-Admin-Password", "secret"))
            .set_payload(sample_csv())
            .to_request();
        let summary: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(summary["success"], true);
        assert_eq!(summary["families"], 3);

        let req = test::TestRequest::get().uri("/api/layout").to_request();
        let doc: AreasDocument = test::call_and_read_body_json(&app, req).await;
        assert_eq!(doc.tables().map(|t| t.seated()).sum::<u32>(), 6);

        let req = test::TestRequest::get().uri("/api/layout/text").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert!(std::str::from_utf8(&body).unwrap().contains("AREA 0"));

        let req = test::TestRequest::get().uri("/api/sizes").to_request();
        let sizes: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(sizes["guests"], 6);
    }

    #[actix_web::test]
    async fn test_bad_csv_is_rejected() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/upload")
            .insert_header(("X-Admin-Password", "secret"))
            .set_payload("Email,Tickets\na@example.com,1")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
