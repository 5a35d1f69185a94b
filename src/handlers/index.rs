// src/handlers/index.rs
use actix_web::HttpResponse;

const PAGE: &str = include_str!("../../static/index.html");

pub async fn index() -> HttpResponse {
    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(PAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{ test, web, App };

    #[actix_web::test]
    async fn serves_trigger_page() {
        let app = test::init_service(App::new().route("/", web::get().to(index))).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

        assert!(resp.status().is_success());
        let body = test::read_body(resp).await;
        let html = String::from_utf8_lossy(&body);
        assert!(html.contains("start-button"));
        assert!(html.contains("/api/server-fetch"));
    }
}
