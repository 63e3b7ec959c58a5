// Store visibility through the vendor content provider.
//
// usage
// let resolver = AndroidContentResolver;
// show_app(&resolver, "com.android.vending")?;
// hide_app(&resolver, "com.android.vending")?;

// reference
// https://developer.android.com/reference/android/content/ContentResolver
// query(Uri, String[], String, String[], String)

#[cfg(target_os = "android")]
use jni::objects::{JObject, JString, JValue};
use tracing::{debug, info};

pub const CONTENT_URI: &str = "content://io.fieldx.content.provider/action";
pub const ACTION_SHOW_APP: u32 = 26;
pub const ACTION_HIDE_APP: u32 = 25;
/// Sort order argument the provider expects.
pub const QUERY_SORT_ORDER: &str = "ORDER";
/// Column carrying the provider's reply.
pub const RESPONSE_COLUMN: &str = "response";

pub fn action_uri(action: u32) -> String {
    format!("{}/{}", CONTENT_URI, action)
}

/// Queries a content provider with a selection string.
pub trait ContentResolver {
    /// `response` column of the single result row. None when the provider
    /// returns no row or more than one.
    fn query(&self, uri: &str, selection: &str) -> std::io::Result<Option<String>>;
}

impl<C: ContentResolver + ?Sized> ContentResolver for Box<C> {
    fn query(&self, uri: &str, selection: &str) -> std::io::Result<Option<String>> {
        (**self).query(uri, selection)
    }
}

/// Ask the provider to make `package_name` visible again.
pub fn show_app<C: ContentResolver + ?Sized>(
    resolver: &C,
    package_name: &str,
) -> std::io::Result<Option<String>> {
    let response = resolver.query(&action_uri(ACTION_SHOW_APP), package_name)?;
    info!("show app {} -> {:?}", package_name, response);
    Ok(response)
}

/// Ask the provider to hide `package_name`.
pub fn hide_app<C: ContentResolver + ?Sized>(
    resolver: &C,
    package_name: &str,
) -> std::io::Result<Option<String>> {
    let response = resolver.query(&action_uri(ACTION_HIDE_APP), package_name)?;
    info!("hide app {} -> {:?}", package_name, response);
    Ok(response)
}

/// Resolver using the hosting Activity's ContentResolver.
#[derive(Debug, Default, Clone, Copy)]
pub struct AndroidContentResolver;

#[cfg(target_os = "android")]
impl ContentResolver for AndroidContentResolver {
    fn query(&self, uri: &str, selection: &str) -> std::io::Result<Option<String>> {
        use crate::android_packagemanager::{clear_pending_exception, with_android_env};

        with_android_env("ContentResolver.query failed", |env| {
            let ctx = ndk_context::android_context();
            let activity = unsafe { JObject::from_raw(ctx.context() as _) };
            let resolver = env
                .call_method(
                    &activity,
                    "getContentResolver",
                    "()Landroid/content/ContentResolver;",
                    &[],
                )?
                .l()?;

            let uri_text = env.new_string(uri)?;
            let uri = env
                .call_static_method(
                    "android/net/Uri",
                    "parse",
                    "(Ljava/lang/String;)Landroid/net/Uri;",
                    &[JValue::Object(&uri_text)],
                )?
                .l()?;

            let projection = env.new_object_array(0, "java/lang/String", JObject::null())?;
            let selection = env.new_string(selection)?;
            let sort_order = env.new_string(QUERY_SORT_ORDER)?;
            let cursor = env
                .call_method(
                    &resolver,
                    "query",
                    "(Landroid/net/Uri;[Ljava/lang/String;Ljava/lang/String;[Ljava/lang/String;Ljava/lang/String;)Landroid/database/Cursor;",
                    &[
                        JValue::Object(&uri),
                        JValue::Object(&projection),
                        JValue::Object(&selection),
                        JValue::Object(&JObject::null()),
                        JValue::Object(&sort_order),
                    ],
                )?
                .l()?;
            if cursor.is_null() {
                return Ok(None);
            }

            let response = read_single_response(env, &cursor);
            if response.is_err() {
                clear_pending_exception(env);
            }
            env.call_method(&cursor, "close", "()V", &[])?;
            response
        })
    }
}

#[cfg(target_os = "android")]
fn read_single_response(
    env: &mut jni::JNIEnv,
    cursor: &JObject,
) -> jni::errors::Result<Option<String>> {
    let count = env.call_method(cursor, "getCount", "()I", &[])?.i()?;
    if count != 1 {
        debug!("content query returned {} rows", count);
        return Ok(None);
    }
    env.call_method(cursor, "moveToNext", "()Z", &[])?;

    let column = env.new_string(RESPONSE_COLUMN)?;
    let index = env
        .call_method(
            cursor,
            "getColumnIndex",
            "(Ljava/lang/String;)I",
            &[JValue::Object(&column)],
        )?
        .i()?;
    if index < 0 {
        return Ok(None);
    }

    let value = env
        .call_method(cursor, "getString", "(I)Ljava/lang/String;", &[JValue::Int(index)])?
        .l()?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(env.get_string(&JString::from(value))?.into()))
}

// Non-Android stub implementation
#[cfg(not(target_os = "android"))]
impl ContentResolver for AndroidContentResolver {
    fn query(&self, uri: &str, _selection: &str) -> std::io::Result<Option<String>> {
        debug!("content query {} is only available on Android", uri);
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "ContentResolver is only available on Android",
        ))
    }
}
