use crate::api;
use crate::cli::commands::ServerArgs;
use crate::cli::{common_config, load_file_config, GlobalArgs};
use crate::config::resolve_server;
use crate::errors::ExploitDbError;
use tracing::info;

pub async fn handle_serve(args: ServerArgs, globals: &GlobalArgs) -> Result<(), ExploitDbError> {
    let file = load_file_config(globals).await?;
    let common = common_config(&file, globals);
    let server = resolve_server(&file, args.bind.as_deref(), args.port);

    let state = api::create_app_state(&common).await?;
    info!(db = state.store.name(), bind = %server.bind, port = server.port, "Starting HTTP Server");
    let app = api::build_router(state);

    let addr = server.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| ExploitDbError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
