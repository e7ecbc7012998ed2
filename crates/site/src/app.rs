use boot_contract::{AppRuntime, BootFlags, InitConfig, StorageResponse, AUTH_TOKEN_KEY};
use boot_host_web::MountNode;
use leptos::*;
use leptos_meta::*;

use crate::ports::SitePorts;

/// Key the shell records its last boot time under.
pub const LAST_VISIT_KEY: &str = "site.last-visit";
const LAST_VISIT_REQUEST_ID: i64 = 1;

/// Leptos-backed application runtime mounted by the boot sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiteRuntime;

impl AppRuntime<MountNode> for SiteRuntime {
    type Handle = SitePorts;

    fn init(&self, config: InitConfig<MountNode>) -> Result<SitePorts, String> {
        let ports = SitePorts::default();

        #[cfg(all(feature = "csr", target_arch = "wasm32"))]
        {
            let flags = config.flags;
            let app_ports = ports.clone();
            leptos::mount_to(config.node, move || {
                view! { <SiteApp flags=flags ports=app_ports /> }
            });
            Ok(ports)
        }

        #[cfg(not(all(feature = "csr", target_arch = "wasm32")))]
        {
            let _ = (config, ports);
            Err("the site runtime renders only in the browser (wasm32 + csr)".to_string())
        }
    }
}

/// Session line shown in the shell.
pub fn session_label(signed_in: bool) -> &'static str {
    if signed_in {
        "Signed in"
    } else {
        "Signed out"
    }
}

#[component]
pub fn SiteApp(flags: BootFlags, ports: SitePorts) -> impl IntoView {
    provide_meta_context();

    let signed_in = create_rw_signal(flags.auth_token().is_some());
    let last_visit = create_rw_signal(None::<String>);

    ports.on_inbound(move |message| {
        match serde_json::from_value::<StorageResponse>(message.clone()) {
            Ok(StorageResponse::ReadResult { request_id, value })
                if request_id == LAST_VISIT_REQUEST_ID =>
            {
                last_visit.set(value);
            }
            Ok(StorageResponse::Changed { key, value }) if key == AUTH_TOKEN_KEY => {
                signed_in.set(value.is_some());
            }
            _ => {}
        }
    });

    // Bindings attach after init returns; defer the first requests until then.
    let boot_ports = ports.clone();
    let boot_time = flags.current_time_unix_ms().to_string();
    request_animation_frame(move || {
        boot_ports.read(LAST_VISIT_KEY, LAST_VISIT_REQUEST_ID);
        boot_ports.write(LAST_VISIT_KEY, &boot_time);
    });

    let sign_out_ports = ports.clone();
    let sign_out = move |_: ev::MouseEvent| {
        sign_out_ports.remove(AUTH_TOKEN_KEY);
        signed_in.set(false);
    };
    let size = flags.window_size();

    view! {
        <Title text="App" />
        <main class="site-root">
            <p class="session">
                {move || session_label(signed_in.get())}
            </p>
            <p class="viewport">{format!("{}x{}", size.width, size.height)}</p>
            <p class="last-visit">
                {move || match last_visit.get() {
                    Some(ms) => format!("Last visit: {ms}"),
                    None => "First visit".to_string(),
                }}
            </p>
            <Show when=move || signed_in.get()>
                <button type="button" on:click=sign_out.clone()>"Sign out"</button>
            </Show>
        </main>
    }
}
