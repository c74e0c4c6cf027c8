use crate::config::AppConfig;
use crate::error::{EMPTY_QUERY_MESSAGE, QueryError};
use crate::io_struct::PromptRequest;
use crate::query_service::QueryService;
use actix_web::http::header::ContentType;
use actix_web::{HttpRequest, HttpResponse, HttpServer, get, post, web};
use std::io::Write;

#[get("/health")]
pub async fn health(_req: HttpRequest) -> HttpResponse {
    HttpResponse::Ok().body("Ok")
}

#[post("/process")]
pub async fn process_query(
    _req: HttpRequest,
    req: web::Json<PromptRequest>,
    service: web::Data<QueryService>,
) -> Result<HttpResponse, QueryError> {
    let Some(query) = req.query() else {
        return Ok(HttpResponse::BadRequest()
            .content_type(ContentType::plaintext())
            .body(EMPTY_QUERY_MESSAGE));
    };

    let response = service.process(Some(query)).await?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(response))
}

/// Registers every route on an app. Shared by the server and the tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(web::scope("/api/natural-language-query").service(process_query));
}

pub fn init_logging(level: log::LevelFilter) {
    env_logger::Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, level)
        .init();
}

pub async fn startup(config: AppConfig, service: QueryService) -> std::io::Result<()> {
    let service = web::Data::new(service);

    log::info!("Starting server at {}:{}", config.host, config.port);

    HttpServer::new(move || {
        actix_web::App::new()
            .wrap(actix_web::middleware::Logger::default())
            .app_data(service.clone())
            .configure(configure)
    })
    .bind((config.host, config.port))?
    .run()
    .await?;

    std::io::Result::Ok(())
}
