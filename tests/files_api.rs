mod common;

use common::TestGateway;
use futures_util::future::join_all;
use reqwest::StatusCode;
use serde_json::Value;

const MIB: usize = 1024 * 1024;

#[tokio::test]
async fn upload_list_serve_delete_lifecycle() {
    let gw = TestGateway::start().await;
    let client = reqwest::Client::new();

    let resp = gw
        .upload(&client, "report.pdf", "application/pdf", vec![b'%'; 2 * MIB], Some("42"))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    let server_id = body["serverId"].as_str().unwrap().to_string();
    assert_eq!(body["originalName"], "report.pdf");
    assert_eq!(body["size"], 2_097_152);
    assert_eq!(body["id"], 1);
    let (ts, rest) = server_id.split_once('-').unwrap();
    assert!(ts.parse::<i64>().is_ok());
    assert_eq!(rest, "report.pdf");

    let rows = gw.store.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["entidad_nombre"], "permiso");
    assert_eq!(rows[0]["entidad_id"], "42");
    assert_eq!(rows[0]["nombre_almacenado"], server_id.as_str());
    assert_eq!(rows[0]["mime_type"], "application/pdf");
    assert_eq!(rows[0]["ruta_archivo"], format!("/uploads/permiso/{server_id}"));

    let listed: Vec<Value> = client
        .get(gw.url("/files/42"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["serverId"], server_id.as_str());
    assert_eq!(listed[0]["id"], server_id.as_str());
    assert_eq!(listed[0]["originalName"], "report.pdf");

    for route in ["uploads", "view"] {
        let resp = client
            .get(gw.url(&format!("/{route}/{server_id}")))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-type"], "application/pdf");
        let disposition = resp.headers()["content-disposition"].to_str().unwrap();
        assert!(disposition.starts_with("inline; filename=\"report.pdf\""));
        assert_eq!(resp.headers()["x-content-type-options"], "nosniff");
        assert_eq!(resp.bytes().await.unwrap().len(), 2 * MIB);
    }

    let resp = client
        .get(gw.url(&format!("/download/{server_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp.headers()["content-disposition"].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"report.pdf\""));

    let resp = client
        .delete(gw.url(&format!("/upload/{server_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["deleted"], server_id.as_str());
    assert_eq!(gw.blob_count(), 0);

    let listed: Vec<Value> = client
        .get(gw.url("/files/42"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed.is_empty());

    let again = client
        .delete(gw.url(&format!("/upload/{server_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);

    let view = client
        .get(gw.url(&format!("/view/{server_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(view.status(), StatusCode::NOT_FOUND);
    let body: Value = view.json().await.unwrap();
    assert_eq!(body["error"], "File not found");
}

#[tokio::test]
async fn oversized_upload_is_rejected_without_writing() {
    let gw = TestGateway::start().await;
    let client = reqwest::Client::new();

    let resp = gw
        .upload(&client, "big.png", "image/png", vec![0; 10 * MIB + 1], Some("1"))
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "File too large");
    assert_eq!(gw.blob_count(), 0);
    assert!(gw.store.rows().is_empty());
}

#[tokio::test]
async fn upload_at_the_ceiling_is_accepted() {
    let gw = TestGateway::start().await;
    let client = reqwest::Client::new();

    let resp = gw
        .upload(&client, "edge.png", "image/png", vec![0; 10 * MIB], Some("1"))
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(gw.blob_count(), 1);
}

#[tokio::test]
async fn disallowed_type_is_rejected_without_writing() {
    let gw = TestGateway::start().await;
    let client = reqwest::Client::new();

    let resp = gw
        .upload(&client, "page.html", "text/html", b"<html>".to_vec(), Some("1"))
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "File type not allowed");
    assert_eq!(gw.blob_count(), 0);
    assert!(gw.store.rows().is_empty());
}

#[tokio::test]
async fn missing_file_field_is_bad_request() {
    let gw = TestGateway::start().await;
    let client = reqwest::Client::new();

    let form = reqwest::multipart::Form::new().text("entidad_nombre", "permiso");
    let resp = client
        .post(gw.url("/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "No file uploaded");
}

#[tokio::test]
async fn permiso_id_is_accepted_as_entity_id() {
    let gw = TestGateway::start().await;
    let client = reqwest::Client::new();

    let part = reqwest::multipart::Part::bytes(vec![1, 2, 3])
        .file_name("a.gif")
        .mime_str("image/gif")
        .unwrap();
    let form = reqwest::multipart::Form::new()
        .text("entidad_nombre", "permiso")
        .text("permiso_id", "77")
        .part("filepond", part);
    let resp = client
        .post(gw.url("/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(gw.store.rows()[0]["entidad_id"], "77");
}

#[tokio::test]
async fn metadata_failure_on_upload_removes_blob() {
    let gw = TestGateway::start().await;
    gw.store.set_failing_inserts(true);
    let client = reqwest::Client::new();

    let resp = gw
        .upload(&client, "scan.jpg", "image/jpeg", vec![0xff; 64], Some("3"))
        .await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Server error 009");
    assert_eq!(gw.blob_count(), 0);
}

#[tokio::test]
async fn missing_files_are_not_found_without_lookup() {
    let gw = TestGateway::start().await;
    let client = reqwest::Client::new();

    for route in ["uploads", "view", "download"] {
        let resp = client
            .get(gw.url(&format!("/{route}/1700000000000-ghost.pdf")))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{route}");
    }
    assert_eq!(gw.store.selects(), 0);
}

#[tokio::test]
async fn traversal_names_are_not_found() {
    let gw = TestGateway::start().await;
    std::fs::write(gw.blobs_dir.parent().unwrap().join("secret.txt"), b"s").unwrap();
    let client = reqwest::Client::new();

    let resp = client
        .get(gw.url("/view/..%2Fsecret.txt"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn nul_byte_names_are_not_found() {
    let gw = TestGateway::start().await;
    let client = reqwest::Client::new();

    for route in ["uploads", "view", "download"] {
        let resp = client
            .get(gw.url(&format!("/{route}/a%00b.pdf")))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{route}");
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "File not found");
    }
    assert_eq!(gw.store.selects(), 0);
}

#[tokio::test]
async fn header_lookup_failure_still_serves_bytes() {
    let gw = TestGateway::start().await;
    let client = reqwest::Client::new();
    let body: Value = gw
        .upload(&client, "photo.webp", "image/webp", vec![9; 32], Some("5"))
        .await
        .json()
        .await
        .unwrap();
    let server_id = body["serverId"].as_str().unwrap().to_string();

    gw.store.set_failing(true);
    let resp = client
        .get(gw.url(&format!("/download/{server_id}")))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "application/octet-stream");
    let disposition = resp.headers()["content-disposition"].to_str().unwrap();
    assert!(disposition.starts_with(&format!("attachment; filename=\"{server_id}\"")));
    assert_eq!(resp.bytes().await.unwrap().len(), 32);
}

#[tokio::test]
async fn store_outage_fails_list_and_delete() {
    let gw = TestGateway::start().await;
    gw.store.set_failing(true);
    let client = reqwest::Client::new();

    let list = client.get(gw.url("/files/1")).send().await.unwrap();
    assert_eq!(list.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = list.json().await.unwrap();
    assert_eq!(body["error"], "Server error 010");

    let del = client
        .delete(gw.url("/upload/1-anything.pdf"))
        .send()
        .await
        .unwrap();
    assert_eq!(del.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = del.json().await.unwrap();
    assert_eq!(body["error"], "Server error 011");
}

#[tokio::test]
async fn listing_without_id_returns_whole_entity_type() {
    let gw = TestGateway::start().await;
    let client = reqwest::Client::new();
    gw.upload(&client, "a.png", "image/png", vec![1], Some("1")).await;
    gw.upload(&client, "b.png", "image/png", vec![2], Some("2")).await;

    let one: Vec<Value> = client
        .get(gw.url("/files/2"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(one.len(), 1);
    assert_eq!(one[0]["originalName"], "b.png");

    let all: Vec<Value> = client
        .get(gw.url("/files"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn concurrent_uploads_get_distinct_storage_names() {
    let gw = TestGateway::start().await;
    let client = reqwest::Client::new();

    let responses = join_all(
        (0..6).map(|_| gw.upload(&client, "same name.pdf", "application/pdf", vec![7; 128], Some("8"))),
    )
    .await;

    let mut ids = Vec::new();
    for resp in responses {
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        ids.push(body["serverId"].as_str().unwrap().to_string());
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 6);
    assert!(ids.iter().all(|id| id.ends_with("same_name.pdf")));
    assert_eq!(gw.blob_count(), 6);
}

#[tokio::test]
async fn health_reflects_store_reachability() {
    let gw = TestGateway::start().await;
    let client = reqwest::Client::new();
    let url = format!("http://{}/health", gw.addr);

    let body: Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["status"], "ok");

    gw.store.set_failing(true);
    let body: Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let gw = TestGateway::start().await;
    let doc: Value = reqwest::get(format!("http://{}/api-docs/openapi.json", gw.addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(doc["paths"]["/filepond/upload"].is_object());
    assert!(doc["components"]["schemas"]["ErrorBody"].is_object());
    let not_found = &doc["paths"]["/filepond/view/{filename}"]["get"]["responses"]["404"];
    assert_eq!(
        not_found["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/ErrorBody"
    );
}
