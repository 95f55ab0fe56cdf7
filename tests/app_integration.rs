use std::sync::Arc;

// Adds automatic logging to tests
mod test_utils {
    use std::fs;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const LATEST_RESPONSE: &str = r#"
    {
        "disclaimer": "Mock disclaimer",
        "license": "Mock license",
        "timestamp": 1690000000,
        "base": "USD",
        "rates": {
            "USD": 1.0,
            "JPY": 147.32,
            "VND": 25380.155
        }
    }"#;

    pub const CURRENCIES_RESPONSE: &str = r#"
    {
        "USD": "United States Dollar",
        "JPY": "Japanese Yen",
        "VND": "Vietnamese Dong"
    }"#;

    pub async fn create_mock_server(app_id: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/latest.json"))
            .and(query_param("app_id", app_id))
            .respond_with(ResponseTemplate::new(200).set_body_string(LATEST_RESPONSE))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/currencies.json"))
            .and(query_param("app_id", app_id))
            .respond_with(ResponseTemplate::new(200).set_body_string(CURRENCIES_RESPONSE))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn write_config(base_url: &str, app_id: &str) -> tempfile::NamedTempFile {
        let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        let config_content = format!(
            r#"
api:
  base_url: "{base_url}"
  app_id: "{app_id}"
currency: "USD"
debounce_ms: 10
"#
        );
        fs::write(config_file.path(), config_content).expect("Failed to write config file");
        config_file
    }
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_server = test_utils::create_mock_server("integration-app-id").await;
    let config_file = test_utils::write_config(&mock_server.uri(), "integration-app-id");

    let result = fxr::run_command(
        fxr::AppCommand::Rates {
            amount: 10.0,
            currency: None,
            filter: None,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;

    assert!(
        result.is_ok(),
        "Rates command failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_filter_and_currency_override() {
    let mock_server = test_utils::create_mock_server("integration-app-id").await;
    let config_file = test_utils::write_config(&mock_server.uri(), "integration-app-id");

    let result = fxr::run_command(
        fxr::AppCommand::Rates {
            amount: 250.0,
            currency: Some("JPY".to_string()),
            filter: Some("dong".to_string()),
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;

    assert!(
        result.is_ok(),
        "Rates command failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_app_flow_rejects_a_currency_outside_the_rate_list() {
    let mock_server = test_utils::create_mock_server("integration-app-id").await;
    let config_file = test_utils::write_config(&mock_server.uri(), "integration-app-id");

    let result = fxr::run_command(
        fxr::AppCommand::Rates {
            amount: 10.0,
            currency: Some("XXX".to_string()),
            filter: None,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;

    let error = result.expect_err("expected the rates command to fail");
    assert!(error.to_string().contains("not in the fetched rate list"));
}

#[test_log::test(tokio::test)]
async fn test_app_flow_surfaces_api_failures() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let mock_server = MockServer::start().await;
    let error_body = r#"
    {
        "error": true,
        "status": 401,
        "message": "invalid_app_id",
        "description": "Invalid App ID provided."
    }"#;
    Mock::given(method("GET"))
        .and(path("/latest.json"))
        .respond_with(ResponseTemplate::new(401).set_body_string(error_body))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/currencies.json"))
        .respond_with(ResponseTemplate::new(401).set_body_string(error_body))
        .mount(&mock_server)
        .await;
    let config_file = test_utils::write_config(&mock_server.uri(), "bad-app-id");

    let result = fxr::run_command(
        fxr::AppCommand::Rates {
            amount: 10.0,
            currency: None,
            filter: None,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;

    let error = result.expect_err("expected the rates command to fail");
    assert!(error.to_string().contains("Failed to load exchange rates"));
}

#[test_log::test(tokio::test)]
async fn test_presenter_end_to_end_against_mock_gateway() {
    use fxr::converter::ConverterPresenter;
    use fxr::providers::OpenExchangeRatesGateway;

    let mock_server = test_utils::create_mock_server("integration-app-id").await;
    let gateway = OpenExchangeRatesGateway::new(&mock_server.uri(), "integration-app-id")
        .expect("Failed to build gateway");
    let presenter = ConverterPresenter::new(Arc::new(gateway))
        .with_selected_symbol("USD")
        .with_debounce(std::time::Duration::from_millis(10));

    presenter.amount_did_change(Some("10"));
    presenter.wait_until_idle().await;

    let rates = presenter.rates();
    assert_eq!(rates.len(), 3);
    let jpy = rates.iter().find(|rate| rate.symbol == "JPY").unwrap();
    assert!((jpy.rate - 1473.2).abs() < 1e-9);

    // Second reload is served from the cache, without touching the network.
    presenter.handle_currency_selected("JPY").await;
    presenter.wait_until_idle().await;

    let rates = presenter.rates();
    let usd = rates.iter().find(|rate| rate.symbol == "USD").unwrap();
    assert!((usd.rate - (10.0 / 147.32)).abs() < 1e-9);

    let requests = mock_server
        .received_requests()
        .await
        .expect("request recording enabled");
    let latest_calls = requests
        .iter()
        .filter(|r| r.url.path() == "/latest.json")
        .count();
    assert_eq!(latest_calls, 1);
}
