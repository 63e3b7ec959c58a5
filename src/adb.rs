// interface for adb commands wrapper
// get_devices : return value of "adb devices"
// list_packages : "pm list packages" with filter flags
// AdbPackageRegistry : PackageRegistry over pm list packages
// AdbLauncher : AppLauncher over "am start" / "monkey"
// AdbContentResolver : ContentResolver over "content query"

use std::collections::HashSet;
use std::process::{Command, Output};

use crate::android_activity::{AppLauncher, ComponentName, LaunchError};
use crate::android_contentprovider::{ContentResolver, QUERY_SORT_ORDER, RESPONSE_COLUMN};
use crate::android_packagemanager_stt::{InstalledApplication, FLAG_SYSTEM};
use crate::calc_disabledapps::PackageRegistry;
use tracing::{debug, error, warn};

pub fn get_devices() -> std::io::Result<Vec<String>> {
    let output = Command::new("adb").arg("devices").arg("-l").output()?;

    if output.status.success() {
        let devices = String::from_utf8_lossy(&output.stdout).to_string();
        Ok(parse_devices(&devices))
    } else {
        let err = String::from_utf8_lossy(&output.stderr).to_string();
        Err(std::io::Error::new(std::io::ErrorKind::Other, err))
    }
}

fn parse_devices(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            // Skip empty lines and the header line
            if line.trim().is_empty() || line.starts_with("List of devices") {
                return None;
            }
            let mut tokens = line.split_whitespace();
            let serial = tokens.next()?;
            // only fully attached devices, not "offline" / "unauthorized"
            if tokens.next()? == "device" {
                Some(serial.to_string())
            } else {
                None
            }
        })
        .collect()
}

fn shell_output(device: Option<&str>, args: &[&str]) -> std::io::Result<Output> {
    let mut cmd = Command::new("adb");
    if let Some(device) = device {
        cmd.arg("-s").arg(device);
    }
    cmd.arg("shell").args(args);
    debug!("adb shell {}", args.join(" "));
    cmd.output()
}

fn shell(device: Option<&str>, args: &[&str]) -> std::io::Result<String> {
    let output = shell_output(device, args)?;
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        let err = String::from_utf8_lossy(&output.stderr).to_string();
        error!("ADB command failed: {}", err);
        Err(std::io::Error::new(std::io::ErrorKind::Other, err))
    }
}

/// Parse `pm list packages` output:
///     package:com.android.vending
///     package:com.android.chrome
pub fn parse_package_list(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let pkg = line.trim().strip_prefix("package:")?.trim();
            if pkg.is_empty() {
                None
            } else {
                Some(pkg.to_string())
            }
        })
        .collect()
}

pub fn list_packages(device: Option<&str>, filters: &[&str]) -> std::io::Result<Vec<String>> {
    let mut args = vec!["pm", "list", "packages"];
    args.extend_from_slice(filters);
    let text = shell(device, &args)?;
    let packages = parse_package_list(&text);
    debug!("pm list packages {:?} -> {} packages", filters, packages.len());
    Ok(packages)
}

/// Registry over a device reachable with adb. pm does not expose labels,
/// so the package id doubles as the display name.
#[derive(Debug, Default, Clone)]
pub struct AdbPackageRegistry {
    pub device: Option<String>,
}

impl AdbPackageRegistry {
    pub fn new(device: Option<String>) -> Self {
        Self { device }
    }
}

impl PackageRegistry for AdbPackageRegistry {
    fn list_all_applications(
        &self,
        include_uninstalled: bool,
    ) -> std::io::Result<Vec<InstalledApplication>> {
        let device = self.device.as_deref();
        let (all, system) = if include_uninstalled {
            (
                list_packages(device, &["-u"])?,
                list_packages(device, &["-s", "-u"])?,
            )
        } else {
            (list_packages(device, &[])?, list_packages(device, &["-s"])?)
        };
        Ok(merge_system_flags(all, &system))
    }

    fn list_enabled_applications(&self) -> std::io::Result<Vec<InstalledApplication>> {
        let device = self.device.as_deref();
        let enabled = list_packages(device, &["-e"])?;
        let system = list_packages(device, &["-s", "-e"])?;
        Ok(merge_system_flags(enabled, &system))
    }

    fn is_package_installed(&self, package_name: &str) -> std::io::Result<bool> {
        // the filter argument is a substring match
        Ok(list_packages(self.device.as_deref(), &[package_name])?
            .iter()
            .any(|pkg| pkg == package_name))
    }
}

fn merge_system_flags(packages: Vec<String>, system: &[String]) -> Vec<InstalledApplication> {
    let system: HashSet<&str> = system.iter().map(String::as_str).collect();
    packages
        .into_iter()
        .map(|pkg| {
            let flags = if system.contains(pkg.as_str()) {
                FLAG_SYSTEM
            } else {
                0
            };
            InstalledApplication {
                label: pkg.clone(),
                package_name: pkg,
                flags,
            }
        })
        .collect()
}

/// True when `am start` / `monkey` output reports a missing target.
fn is_not_found_output(text: &str) -> bool {
    text.contains("does not exist")
        || text.contains("No activities found")
        || text.contains("Error type 3")
        || text.lines().any(|l| l.trim_start().starts_with("Error:"))
}

#[derive(Debug, Default, Clone)]
pub struct AdbLauncher {
    pub device: Option<String>,
}

impl AdbLauncher {
    pub fn new(device: Option<String>) -> Self {
        Self { device }
    }
}

/// Map the outcome of `am start` / `monkey` to a launch result. Both tools
/// report a missing target on either stream, monkey also exits non-zero.
fn launch_result(target: &str, output: &Output) -> Result<(), LaunchError> {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    if is_not_found_output(&stdout) || is_not_found_output(&stderr) {
        warn!("launch of {} failed: {} {}", target, stdout.trim(), stderr.trim());
        return Err(LaunchError::ActivityNotFound(target.to_string()));
    }
    if !output.status.success() {
        error!("ADB command failed: {}", stderr);
        return Err(LaunchError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            stderr.to_string(),
        )));
    }
    Ok(())
}

impl AppLauncher for AdbLauncher {
    fn launch_component(&mut self, component: &ComponentName) -> Result<(), LaunchError> {
        let target = component.flatten();
        let output = shell_output(
            self.device.as_deref(),
            &[
                "am",
                "start",
                "-a",
                "android.intent.action.MAIN",
                "-c",
                "android.intent.category.LAUNCHER",
                "-n",
                target.as_str(),
            ],
        )?;
        launch_result(&target, &output)
    }

    fn launch_package(&mut self, package_name: &str) -> Result<(), LaunchError> {
        let output = shell_output(
            self.device.as_deref(),
            &[
                "monkey",
                "-p",
                package_name,
                "-c",
                "android.intent.category.LAUNCHER",
                "1",
            ],
        )?;
        launch_result(package_name, &output)
    }
}

/// Parse `content query` output. One line per row:
///     Row: 0 response={"code":200}
/// or `No result found.` when empty.
pub fn parse_content_response(text: &str) -> Option<String> {
    let rows: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("Row:"))
        .collect();
    if rows.len() != 1 {
        debug!("content query returned {} rows", rows.len());
        return None;
    }
    let key = format!("{}=", RESPONSE_COLUMN);
    let (_, value) = rows[0].split_once(key.as_str())?;
    // trailing columns are ", name=value"
    let value = value.split(", ").next().unwrap_or(value);
    if value == "NULL" {
        None
    } else {
        Some(value.to_string())
    }
}

#[derive(Debug, Default, Clone)]
pub struct AdbContentResolver {
    pub device: Option<String>,
}

impl AdbContentResolver {
    pub fn new(device: Option<String>) -> Self {
        Self { device }
    }
}

impl ContentResolver for AdbContentResolver {
    fn query(&self, uri: &str, selection: &str) -> std::io::Result<Option<String>> {
        let where_clause = format!("'{}'", selection.replace('\'', ""));
        let text = shell(
            self.device.as_deref(),
            &[
                "content",
                "query",
                "--uri",
                uri,
                "--where",
                where_clause.as_str(),
                "--sort",
                QUERY_SORT_ORDER,
            ],
        )?;
        Ok(parse_content_response(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_devices() {
        let text = "List of devices attached\n\
                    emulator-5554          device product:sdk model:sdk\n\
                    R58M1234ABC            unauthorized usb:1-1\n\
                    \n";
        assert_eq!(parse_devices(text), vec!["emulator-5554"]);
    }

    #[test]
    fn test_parse_package_list() {
        let text = "package:com.android.vending\r\npackage:com.android.chrome\n\ngarbage\npackage:\n";
        assert_eq!(
            parse_package_list(text),
            vec!["com.android.vending", "com.android.chrome"]
        );
    }

    #[test]
    fn test_merge_system_flags() {
        let apps = merge_system_flags(
            vec!["a.sys".to_string(), "b.user".to_string()],
            &["a.sys".to_string()],
        );
        assert!(apps[0].is_system());
        assert!(!apps[1].is_system());
        assert_eq!(apps[1].label, "b.user");
    }

    #[test]
    fn test_not_found_output() {
        assert!(is_not_found_output(
            "Starting: Intent { cmp=io.fieldx.store/.Main }\nError type 3\nError: Activity class {io.fieldx.store/io.fieldx.store.Main} does not exist.\n"
        ));
        assert!(is_not_found_output("** No activities found to run, monkey aborted.\n"));
        assert!(!is_not_found_output(
            "Starting: Intent { act=android.intent.action.MAIN cmp=com.example/.Main }\n"
        ));
    }

    #[cfg(unix)]
    fn output(code: i32, stdout: &str, stderr: &str) -> Output {
        use std::os::unix::process::ExitStatusExt;
        Output {
            status: std::process::ExitStatus::from_raw(code << 8),
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_monkey_stderr_not_found_is_activity_not_found() {
        let out = output(
            252,
            "",
            "  bash arg: -p\n** No activities found to run, monkey aborted.\n",
        );
        assert!(matches!(
            launch_result("io.fieldx.store", &out),
            Err(LaunchError::ActivityNotFound(pkg)) if pkg == "io.fieldx.store"
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_other_launch_failures_stay_io() {
        let out = output(1, "", "error: device offline\n");
        assert!(matches!(
            launch_result("io.fieldx.store", &out),
            Err(LaunchError::Io(_))
        ));

        let out = output(0, "Starting: Intent { cmp=com.example/.Main }\n", "");
        assert!(launch_result("com.example/.Main", &out).is_ok());
    }

    #[test]
    fn test_parse_content_response() {
        assert_eq!(
            parse_content_response("Row: 0 response={\"code\":200}\n"),
            Some("{\"code\":200}".to_string())
        );
        assert_eq!(parse_content_response("No result found.\n"), None);
        assert_eq!(
            parse_content_response("Row: 0 response=a\nRow: 1 response=b\n"),
            None
        );
        assert_eq!(parse_content_response("Row: 0 response=NULL\n"), None);
    }
}
