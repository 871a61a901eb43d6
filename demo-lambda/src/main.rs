/// A sample lambda with one handler per trigger.
/// The trigger is picked with DEMO_TRIGGER: `api_gateway` (default), `dynamodb` or `s3`.
use lamb::anyhow::Context as _;
use lamb::{ApiError, ApiGatewayContext, Config, DynamoDbContext, Error, EventType, S3Context, Validate};
use lambda_runtime::service_fn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[derive(Deserialize, Serialize, Debug)]
struct Artist {
    name: String,
    #[serde(default)]
    genre: String,
}

impl Validate for Artist {
    fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(ApiError::new(400, "INVALID_NAME", "Name cannot be empty").into());
        }
        Ok(())
    }
}

#[derive(Deserialize, Debug)]
struct ArtistRecord {
    pk: String,
    #[serde(default)]
    image_url: String,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::from_env()?;
    lamb::init_tracing(&config)?;

    let trigger = std::env::var("DEMO_TRIGGER").unwrap_or_else(|_| "api_gateway".to_owned());
    info!("Starting demo lambda for {trigger}");

    match trigger.as_str() {
        "api_gateway" => {
            let dispatcher = Arc::new(lamb::api_gateway(create_artist));
            lambda_runtime::run(service_fn(move |event| {
                let dispatcher = Arc::clone(&dispatcher);
                async move { Ok::<_, Error>(dispatcher.handle(event).await) }
            }))
            .await
        }
        "dynamodb" => {
            let dispatcher = Arc::new(lamb::dynamodb(sync_artist));
            lambda_runtime::run(service_fn(move |event| {
                let dispatcher = Arc::clone(&dispatcher);
                async move { dispatcher.handle(event).await }
            }))
            .await
        }
        "s3" => {
            let dispatcher = Arc::new(lamb::s3(register_upload));
            lambda_runtime::run(service_fn(move |event| {
                let dispatcher = Arc::clone(&dispatcher);
                async move { dispatcher.handle(event).await }
            }))
            .await
        }
        other => Err(Error::from(format!("unknown DEMO_TRIGGER {other:?}"))),
    }
}

async fn create_artist(mut c: ApiGatewayContext) -> Result<(), Error> {
    let artist: Artist = c.bind_valid()?;

    info!(genre = %artist.genre, "Creating artist {}", artist.name);

    c.header("Cache-Control", "no-store");
    c.created(format!("/artists/{}", artist.name))
}

async fn sync_artist(c: DynamoDbContext) -> Result<(), Error> {
    let record: ArtistRecord = c.bind()?;

    match c.event_type() {
        Some(EventType::Remove) => info!("Artist {} removed", record.pk),
        Some(EventType::Insert | EventType::Modify) => {
            info!(image_url = %record.image_url, "Artist {} changed", record.pk)
        }
        None => info!("Skipping {} for artist {}", c.record().event_name, record.pk),
    }

    Ok(())
}

async fn register_upload(c: S3Context) -> Result<(), Error> {
    let object = &c.record().s3.object;

    let key = object.key.as_deref().context("S3 record without an object key")?;
    let size = u64::try_from(object.size.unwrap_or_default())
        .with_context(|| format!("S3 object {key} reports a negative size"))?;

    info!(size, "Registered upload {key}");

    Ok(())
}
