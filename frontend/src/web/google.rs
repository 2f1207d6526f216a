//! Google Identity Services 封装
//!
//! 动态注入 GIS 脚本，渲染官方登录按钮，并把回调里的身份断言
//! (credential) 交给调用方。脚本只注入一次，重复调用直接复用。

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

const SCRIPT_ID: &str = "google-identity";
const SCRIPT_SRC: &str = "https://accounts.google.com/gsi/client";

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["google", "accounts", "id"], js_name = initialize)]
    fn gis_initialize(config: &JsValue);

    #[wasm_bindgen(js_namespace = ["google", "accounts", "id"], js_name = renderButton)]
    fn gis_render_button(parent: &web_sys::Element, options: &JsValue);
}

/// 确保 GIS 脚本已加载，就绪后调用 `on_ready`
///
/// 加载失败只会在控制台留下错误，按钮不会渲染；
/// 密码登录路径不受影响。
pub fn load_identity_script(on_ready: impl FnOnce() + 'static) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };

    if document.get_element_by_id(SCRIPT_ID).is_some() {
        on_ready();
        return;
    }

    let Ok(element) = document.create_element("script") else {
        return;
    };
    let Ok(script) = element.dyn_into::<web_sys::HtmlScriptElement>() else {
        return;
    };
    script.set_id(SCRIPT_ID);
    script.set_src(SCRIPT_SRC);
    script.set_async(true);
    script.set_defer(true);

    let onload = Closure::once(on_ready);
    script.set_onload(Some(onload.as_ref().unchecked_ref()));
    onload.forget();

    let onerror = Closure::<dyn FnMut()>::new(|| {
        web_sys::console::error_1(&"[Google] failed to load identity services script".into());
    });
    script.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onerror.forget();

    if let Some(head) = document.head() {
        let _ = head.append_child(&script);
    }
}

/// 初始化登录回调并在 `parent` 内渲染按钮
///
/// `on_credential` 收到的是 Google 返回的 ID token，
/// 后续由会话流程拿去向后端换取本站令牌。
pub fn init_button(client_id: &str, parent: &web_sys::Element, on_credential: impl Fn(String) + 'static) {
    let callback = Closure::<dyn FnMut(JsValue)>::new(move |response: JsValue| {
        let credential = js_sys::Reflect::get(&response, &JsValue::from_str("credential"))
            .ok()
            .and_then(|v| v.as_string());
        match credential {
            Some(credential) => on_credential(credential),
            None => {
                web_sys::console::error_1(&"[Google] response carried no credential".into());
            }
        }
    });

    let config = js_sys::Object::new();
    let _ = js_sys::Reflect::set(
        &config,
        &JsValue::from_str("client_id"),
        &JsValue::from_str(client_id),
    );
    let _ = js_sys::Reflect::set(&config, &JsValue::from_str("callback"), callback.as_ref());
    gis_initialize(&config);
    callback.forget();

    let options = js_sys::Object::new();
    for (key, value) in [
        ("theme", "outline"),
        ("size", "large"),
        ("text", "signin_with"),
        ("shape", "rectangular"),
    ] {
        let _ = js_sys::Reflect::set(&options, &JsValue::from_str(key), &JsValue::from_str(value));
    }
    gis_render_button(parent, &options);
}
