use super::auth::{OAuthCredentials, TokenProvider};
use super::{ApiError, SheetsBackend};
use crate::model::{
    AppendOptions, AppendValuesResponse, BatchGetValuesResponse, BatchUpdateSpreadsheetRequest,
    BatchUpdateSpreadsheetResponse, BatchUpdateValuesRequest, BatchUpdateValuesResponse,
    ClearValuesResponse, CreateSpreadsheetRequest, GetSpreadsheetQuery,
    SearchDeveloperMetadataRequest, SearchDeveloperMetadataResponse, SheetProperties, Spreadsheet,
    UpdateValuesResponse, ValueRange, ValuesReadOptions,
};
use crate::tools::param_enums::ValueInputOption;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

pub const DEFAULT_API_BASE_URL: &str = "https://sheets.googleapis.com/v4";

/// Sheets v4 over HTTPS, authenticated with a refreshed OAuth bearer token.
pub struct HttpSheetsBackend {
    client: Client,
    base_url: Url,
    tokens: TokenProvider,
}

impl HttpSheetsBackend {
    pub fn with_endpoints(
        api_base_url: &str,
        token_url: &str,
        credentials: OAuthCredentials,
    ) -> Result<Self> {
        let base_url = Url::parse(api_base_url)
            .with_context(|| format!("invalid api base url '{api_base_url}'"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("api base url '{api_base_url}' cannot carry a path");
        }
        let client = Client::new();
        let tokens = TokenProvider::new(client.clone(), token_url, credentials);
        Ok(Self {
            client,
            base_url,
            tokens,
        })
    }

    /// Appends each segment to the base path, percent-encoding it as one
    /// segment so ranges like `Sheet 1!A1:B2` survive intact.
    fn url<I, S>(&self, segments: I) -> Result<Url>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("api base url cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn spreadsheet_url(&self, spreadsheet_id: &str, tail: &[&str]) -> Result<Url> {
        self.url(["spreadsheets", spreadsheet_id].iter().chain(tail))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let token = self.tokens.access_token().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .context("sheets api request failed")?;
        decode_response(response).await
    }
}

fn read_query(options: ValuesReadOptions) -> Vec<(&'static str, &'static str)> {
    let mut query = Vec::new();
    if let Some(dimension) = options.major_dimension {
        query.push(("majorDimension", dimension.as_str()));
    }
    if let Some(render) = options.value_render_option {
        query.push(("valueRenderOption", render.as_str()));
    }
    query
}

/// Decodes a 2xx body into `T`, or turns any other status into an [`ApiError`].
pub(crate) async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .context("failed to read response body")?;

    if !status.is_success() {
        let data = serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        tracing::debug!(status = status.as_u16(), "remote call rejected");
        return Err(ApiError::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            data,
        )
        .into());
    }

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return serde_json::from_value(json!({})).context("empty response body");
    }
    serde_json::from_slice(&bytes).context("failed to decode response body")
}

#[async_trait]
impl SheetsBackend for HttpSheetsBackend {
    async fn create_spreadsheet(&self, body: &CreateSpreadsheetRequest) -> Result<Spreadsheet> {
        let url = self.url(["spreadsheets"])?;
        self.send(self.client.post(url).json(body)).await
    }

    async fn get_spreadsheet(
        &self,
        spreadsheet_id: &str,
        query: &GetSpreadsheetQuery,
    ) -> Result<Spreadsheet> {
        let url = self.spreadsheet_url(spreadsheet_id, &[])?;
        let mut params: Vec<(&str, String)> = query
            .ranges
            .iter()
            .map(|range| ("ranges", range.clone()))
            .collect();
        if let Some(include) = query.include_grid_data {
            params.push(("includeGridData", include.to_string()));
        }
        self.send(self.client.get(url).query(&params)).await
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        body: &BatchUpdateSpreadsheetRequest,
    ) -> Result<BatchUpdateSpreadsheetResponse> {
        let url = self.url(["spreadsheets".to_string(), format!("{spreadsheet_id}:batchUpdate")])?;
        self.send(self.client.post(url).json(body)).await
    }

    async fn copy_sheet_to(
        &self,
        spreadsheet_id: &str,
        sheet_id: i32,
        destination_spreadsheet_id: &str,
    ) -> Result<SheetProperties> {
        let copy = format!("{sheet_id}:copyTo");
        let url = self.spreadsheet_url(spreadsheet_id, &["sheets", &copy])?;
        let body = json!({ "destinationSpreadsheetId": destination_spreadsheet_id });
        self.send(self.client.post(url).json(&body)).await
    }

    async fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        options: ValuesReadOptions,
    ) -> Result<ValueRange> {
        let url = self.spreadsheet_url(spreadsheet_id, &["values", range])?;
        self.send(self.client.get(url).query(&read_query(options)))
            .await
    }

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        value_input_option: ValueInputOption,
        body: &ValueRange,
    ) -> Result<UpdateValuesResponse> {
        let url = self.spreadsheet_url(spreadsheet_id, &["values", range])?;
        let request = self
            .client
            .put(url)
            .query(&[("valueInputOption", value_input_option.as_str())])
            .json(body);
        self.send(request).await
    }

    async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        options: AppendOptions,
        body: &ValueRange,
    ) -> Result<AppendValuesResponse> {
        let append = format!("{range}:append");
        let url = self.spreadsheet_url(spreadsheet_id, &["values", &append])?;
        let request = self
            .client
            .post(url)
            .query(&[
                ("valueInputOption", options.value_input_option.as_str()),
                ("insertDataOption", options.insert_data_option.as_str()),
            ])
            .json(body);
        self.send(request).await
    }

    async fn clear_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<ClearValuesResponse> {
        let clear = format!("{range}:clear");
        let url = self.spreadsheet_url(spreadsheet_id, &["values", &clear])?;
        self.send(self.client.post(url).json(&json!({}))).await
    }

    async fn batch_get_values(
        &self,
        spreadsheet_id: &str,
        ranges: &[String],
        options: ValuesReadOptions,
    ) -> Result<BatchGetValuesResponse> {
        let url = self.spreadsheet_url(spreadsheet_id, &["values:batchGet"])?;
        let mut params: Vec<(&str, &str)> = ranges
            .iter()
            .map(|range| ("ranges", range.as_str()))
            .collect();
        params.extend(read_query(options));
        self.send(self.client.get(url).query(&params)).await
    }

    async fn batch_update_values(
        &self,
        spreadsheet_id: &str,
        body: &BatchUpdateValuesRequest,
    ) -> Result<BatchUpdateValuesResponse> {
        let url = self.spreadsheet_url(spreadsheet_id, &["values:batchUpdate"])?;
        self.send(self.client.post(url).json(body)).await
    }

    async fn search_developer_metadata(
        &self,
        spreadsheet_id: &str,
        body: &SearchDeveloperMetadataRequest,
    ) -> Result<SearchDeveloperMetadataResponse> {
        let url = self.spreadsheet_url(spreadsheet_id, &["developerMetadata:search"])?;
        self.send(self.client.post(url).json(body)).await
    }

    fn name(&self) -> &'static str {
        "google-sheets-http"
    }
}
