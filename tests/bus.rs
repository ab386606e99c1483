//! Integration tests for the exported settings objects, over a peer-to-peer bus.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![allow(clippy::panic)]

use std::time::Duration;

use futures::{FutureExt, StreamExt};
use nm_user_settings::{
    config::Config,
    services::network_settings::{
        NM_CONNECTION_IFACE, NM_SECRETS_IFACE, NM_SETTINGS_IFACE, NM_SETTINGS_PATH, SecretsError,
        SettingsDirectory, SettingsMap, setting_value,
    },
};
use tokio::net::UnixStream;
use zbus::{
    Connection, Guid, Message, MessageStream, connection::Builder, message::Type,
    zvariant::OwnedObjectPath,
};

const WAIT: Duration = Duration::from_secs(5);

const TIMED_OUT: &str = "org.freedesktop.DBus.Error.TimedOut";
const FAILED: &str = "org.freedesktop.DBus.Error.Failed";
const ACCESS_DENIED: &str = "org.freedesktop.DBus.Error.AccessDenied";
const SERVICE_UNKNOWN: &str = "org.freedesktop.DBus.Error.ServiceUnknown";
const UNKNOWN_OBJECT: &str = "org.freedesktop.DBus.Error.UnknownObject";
const UNKNOWN_INTERFACE: &str = "org.freedesktop.DBus.Error.UnknownInterface";

async fn serve(config: &Config) -> (SettingsDirectory, Connection) {
    let guid = Guid::generate();
    let (server_end, client_end) = UnixStream::pair().unwrap();
    let (server, client) = futures::try_join!(
        Builder::unix_stream(server_end)
            .server(guid)
            .unwrap()
            .p2p()
            .build(),
        Builder::unix_stream(client_end).p2p().build(),
    )
    .unwrap();

    let directory = SettingsDirectory::serve(server, config).await.unwrap();
    (directory, client)
}

fn group(name: &str, key: &str, value: &str) -> SettingsMap {
    let mut settings = SettingsMap::new();
    settings.insert(
        name.to_string(),
        [(key.to_string(), setting_value(value).unwrap())]
            .into_iter()
            .collect(),
    );
    settings
}

fn wireless(ssid: &str) -> SettingsMap {
    group("wireless", "ssid", ssid)
}

fn psk(value: &str) -> SettingsMap {
    group("802-11-wireless-security", "psk", value)
}

async fn list_connections(client: &Connection) -> Vec<OwnedObjectPath> {
    let reply = client
        .call_method(
            None::<&str>,
            NM_SETTINGS_PATH,
            Some(NM_SETTINGS_IFACE),
            "ListConnections",
            &(),
        )
        .await
        .unwrap();
    reply.body().deserialize().unwrap()
}

async fn get_settings(client: &Connection, path: &str) -> zbus::Result<SettingsMap> {
    let reply = client
        .call_method(None::<&str>, path, Some(NM_CONNECTION_IFACE), "GetSettings", &())
        .await?;
    let settings = reply.body().deserialize()?;
    Ok(settings)
}

async fn get_secrets(
    client: &Connection,
    path: &str,
    request_new: bool,
) -> zbus::Result<SettingsMap> {
    let reply = client
        .call_method(
            None::<&str>,
            path,
            Some(NM_SECRETS_IFACE),
            "GetSecrets",
            &("802-11-wireless-security", Vec::<String>::new(), request_new),
        )
        .await?;
    let secrets = reply.body().deserialize()?;
    Ok(secrets)
}

fn error_reply(result: zbus::Result<SettingsMap>) -> (String, String) {
    match result {
        Err(zbus::Error::MethodError(name, detail, _)) => {
            (name.as_str().to_string(), detail.unwrap_or_default())
        }
        Err(other) => panic!("expected an error reply, got {other}"),
        Ok(_) => panic!("expected an error reply, got secrets"),
    }
}

fn new_connection_path(message: &Message) -> Option<OwnedObjectPath> {
    let header = message.header();
    let is_signal = header.message_type() == Type::Signal
        && header.interface().map(|i| i.as_str()) == Some(NM_SETTINGS_IFACE)
        && header.member().map(|m| m.as_str()) == Some("NewConnection");
    if !is_signal {
        return None;
    }
    assert_eq!(header.path().map(|p| p.as_str()), Some(NM_SETTINGS_PATH));
    message.body().deserialize().ok()
}

async fn next_new_connection(stream: &mut MessageStream) -> OwnedObjectPath {
    let wait = async {
        while let Some(message) = stream.next().await {
            if let Some(path) = new_connection_path(&message.unwrap()) {
                return path;
            }
        }
        panic!("message stream ended");
    };
    tokio::time::timeout(WAIT, wait).await.unwrap()
}

mod listing {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn every_listed_path_answers_get_settings() {
        let (directory, client) = serve(&Config::default()).await;

        for ssid in ["home-net", "work-net"] {
            directory
                .add_connection(ssid, wireless(ssid), None)
                .await
                .unwrap();
        }

        let listed = list_connections(&client).await;
        assert_eq!(listed, directory.get_settings().list_connections());
        assert_eq!(listed.len(), 2);

        for (path, ssid) in listed.iter().zip(["home-net", "work-net"]) {
            let settings = get_settings(&client, path.as_str()).await.unwrap();
            assert_eq!(settings, wireless(ssid));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn new_connection_arrives_once_after_listing() {
        let (directory, client) = serve(&Config::default()).await;
        let mut stream = MessageStream::from(&client);

        let connection = directory
            .add_connection("home-net", wireless("home-net"), None)
            .await
            .unwrap();

        let announced = next_new_connection(&mut stream).await;
        assert_eq!(&announced, connection.path());
        assert!(list_connections(&client).await.contains(&announced));

        let mut repeated = 0;
        while let Some(Some(message)) = stream.next().now_or_never() {
            if new_connection_path(&message.unwrap()).is_some() {
                repeated += 1;
            }
        }
        assert_eq!(repeated, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn replaced_connection_is_withdrawn() {
        let (directory, client) = serve(&Config::default()).await;

        let old = directory
            .add_connection("home-net", wireless("home-net"), None)
            .await
            .unwrap();
        let new = directory
            .add_connection("home-net", wireless("home-net"), None)
            .await
            .unwrap();

        assert_eq!(list_connections(&client).await, vec![new.path().clone()]);
        assert!(get_settings(&client, new.path().as_str()).await.is_ok());

        let (name, _) = error_reply(get_settings(&client, old.path().as_str()).await);
        assert!(
            name == UNKNOWN_OBJECT || name == UNKNOWN_INTERFACE,
            "unexpected error {name}"
        );
        let (name, _) = error_reply(get_secrets(&client, old.path().as_str(), false).await);
        assert!(
            name == UNKNOWN_OBJECT || name == UNKNOWN_INTERFACE,
            "unexpected error {name}"
        );
    }
}

mod secrets {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn cached_secrets_are_returned_directly() {
        let (directory, client) = serve(&Config::default()).await;
        let connection = directory
            .add_connection("cached-net", wireless("cached-net"), Some(psk("x")))
            .await
            .unwrap();

        let secrets = get_secrets(&client, connection.path().as_str(), false)
            .await
            .unwrap();

        assert_eq!(secrets, psk("x"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn deferred_reply_carries_the_subscriber_answer() {
        let (directory, client) = serve(&Config::default()).await;
        let mut requests = directory.get_settings().secrets_requests();
        let connection = directory
            .add_connection("home-net", wireless("home-net"), None)
            .await
            .unwrap();

        let provider = tokio::spawn(async move {
            let request = requests.next().await.unwrap();
            assert_eq!(request.connection.ssid(), "home-net");
            request.reply(psk("hunter2"))
        });

        let secrets = tokio::time::timeout(
            WAIT,
            get_secrets(&client, connection.path().as_str(), false),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(secrets, psk("hunter2"));
        assert!(provider.await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn request_new_bypasses_cached_secrets() {
        let (directory, client) = serve(&Config::default()).await;
        let mut requests = directory.get_settings().secrets_requests();
        let connection = directory
            .add_connection("cached-net", wireless("cached-net"), Some(psk("x")))
            .await
            .unwrap();

        let provider = tokio::spawn(async move {
            let request = requests.next().await.unwrap();
            request.reply(psk("fresh"))
        });

        let secrets = tokio::time::timeout(
            WAIT,
            get_secrets(&client, connection.path().as_str(), true),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(secrets, psk("fresh"));
        assert!(provider.await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn idle_subscriber_times_out() {
        let mut config = Config::default();
        config.secrets.request_timeout_secs = Some(1);
        let (directory, client) = serve(&config).await;
        let _requests = directory.get_settings().secrets_requests();
        let connection = directory
            .add_connection("home-net", wireless("home-net"), None)
            .await
            .unwrap();

        let result = tokio::time::timeout(
            WAIT,
            get_secrets(&client, connection.path().as_str(), false),
        )
        .await
        .unwrap();

        let (name, _) = error_reply(result);
        assert_eq!(name, TIMED_OUT);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn missing_subscriber_fails_as_abandoned() {
        let (directory, client) = serve(&Config::default()).await;
        let connection = directory
            .add_connection("home-net", wireless("home-net"), None)
            .await
            .unwrap();

        let result = tokio::time::timeout(
            WAIT,
            get_secrets(&client, connection.path().as_str(), false),
        )
        .await
        .unwrap();

        let (name, detail) = error_reply(result);
        assert_eq!(name, FAILED);
        assert!(detail.contains("abandoned"), "unexpected detail {detail}");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn subscriber_errors_map_to_bus_errors() {
        let (directory, client) = serve(&Config::default()).await;
        let mut requests = directory.get_settings().secrets_requests();
        let connection = directory
            .add_connection("home-net", wireless("home-net"), None)
            .await
            .unwrap();

        let provider = tokio::spawn(async move {
            for error in [SecretsError::Canceled, SecretsError::NoProvider] {
                let request = requests.next().await.unwrap();
                request.error(error);
            }
        });

        let path = connection.path().as_str();
        for expected in [ACCESS_DENIED, SERVICE_UNKNOWN] {
            let result = tokio::time::timeout(WAIT, get_secrets(&client, path, false))
                .await
                .unwrap();
            let (name, _) = error_reply(result);
            assert_eq!(name, expected);
        }

        provider.await.unwrap();
    }
}
