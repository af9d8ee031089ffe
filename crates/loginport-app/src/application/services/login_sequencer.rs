use log::{debug, error, info, warn};
use loginport_domain::client::ClientRecord;
use loginport_domain::login::{
    BrowserLauncher, DriverError, LandingSignal, LoginDriver, LoginOutcome, LoginStep,
};
use loginport_domain::otp::OtpGenerator;
use loginport_domain::DomainError;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::application::config::LoginTimeouts;

/// DOM selectors of the AWS console sign-in pages
pub mod selectors {
    pub const USERNAME: &str = "#username";
    pub const PASSWORD: &str = "#password";
    pub const SIGN_IN: &str = "#signin_button";
    pub const MFA_FIELD: &str = r#"[id="mfacode" i]"#;
    pub const MFA_SUBMIT: &str = r#"button[type="submit"], button.awsui-button"#;
    pub const CONSOLE_ANCHOR: &str = "#aws-console-root, #consoleHomeDashboard";
}

type StepResult<T> = Result<T, (LoginStep, DomainError)>;

fn at(step: LoginStep) -> impl FnOnce(DriverError) -> (LoginStep, DomainError) {
    move |err| (step, DomainError::from(err))
}

/// Drives one browser through the console sign-in flow.
///
/// Each step either advances or ends the run; nothing is retried.
pub struct LoginSequencer {
    launcher: Arc<dyn BrowserLauncher>,
    otp: Arc<dyn OtpGenerator>,
    timeouts: LoginTimeouts,
}

impl LoginSequencer {
    pub fn new(
        launcher: Arc<dyn BrowserLauncher>,
        otp: Arc<dyn OtpGenerator>,
        timeouts: LoginTimeouts,
    ) -> Self {
        Self {
            launcher,
            otp,
            timeouts,
        }
    }

    /// Run the sequence on a detached task; the caller does not wait.
    pub fn spawn(self: &Arc<Self>, client: ClientRecord) -> JoinHandle<LoginOutcome> {
        let sequencer = Arc::clone(self);
        tokio::spawn(async move { sequencer.run(&client).await })
    }

    pub async fn run(&self, client: &ClientRecord) -> LoginOutcome {
        let label = client.name();
        let url = client.sign_in_url();
        info!("[{}] 🚀 Starting console login at {}", label, url);

        let driver = match self.launcher.launch(&url, label).await {
            Ok(driver) => driver,
            Err(e) => {
                error!("[{}] Login failed at {}: {}", label, LoginStep::Launch, e);
                return LoginOutcome::Failed {
                    step: LoginStep::Launch,
                    error: e,
                };
            }
        };

        let outcome = match self.drive(driver.as_ref(), client).await {
            Ok(landing) => {
                info!("[{}] ✅ {} (landing: {:?})", label, LoginStep::Done, landing);
                LoginOutcome::Completed { landing }
            }
            Err((step, _)) if !driver.is_connected() => {
                warn!("[{}] Browser closed by user during {}", label, step);
                LoginOutcome::Aborted { step }
            }
            Err((step, error)) => {
                error!(
                    "[{}] ❌ Login failed at {}: {}",
                    label,
                    step,
                    error.format_with_code()
                );
                LoginOutcome::Failed { step, error }
            }
        };

        // The window stays with the operator whatever happened
        driver.keep_open();
        outcome
    }

    async fn drive(
        &self,
        driver: &dyn LoginDriver,
        client: &ClientRecord,
    ) -> StepResult<LandingSignal> {
        let label = client.name();
        let t = &self.timeouts;

        debug!("[{}] {}", label, LoginStep::FillUsername);
        driver
            .wait_visible(selectors::USERNAME, t.element_wait)
            .await
            .map_err(at(LoginStep::FillUsername))?;
        driver
            .type_text(selectors::USERNAME, client.username())
            .await
            .map_err(at(LoginStep::FillUsername))?;

        debug!("[{}] {}", label, LoginStep::FillPassword);
        driver
            .wait_visible(selectors::PASSWORD, t.element_wait)
            .await
            .map_err(at(LoginStep::FillPassword))?;
        driver
            .type_text(selectors::PASSWORD, client.password())
            .await
            .map_err(at(LoginStep::FillPassword))?;

        debug!("[{}] {}", label, LoginStep::SubmitCredentials);
        driver
            .wait_visible(selectors::SIGN_IN, t.element_wait)
            .await
            .map_err(at(LoginStep::SubmitCredentials))?;
        driver
            .click(selectors::SIGN_IN)
            .await
            .map_err(at(LoginStep::SubmitCredentials))?;

        debug!("[{}] {}", label, LoginStep::AwaitMfaField);
        driver
            .wait_visible(selectors::MFA_FIELD, t.mfa_field)
            .await
            .map_err(at(LoginStep::AwaitMfaField))?;

        debug!("[{}] {}", label, LoginStep::FillMfa);
        // Code is computed only now so it is fresh for this window
        let code = self
            .otp
            .generate(client.mfa_secret())
            .map_err(|e| (LoginStep::FillMfa, e))?;
        driver
            .type_text(selectors::MFA_FIELD, &code)
            .await
            .map_err(at(LoginStep::FillMfa))?;

        debug!("[{}] {}", label, LoginStep::SubmitMfa);
        driver
            .wait_visible(selectors::MFA_SUBMIT, t.element_wait)
            .await
            .map_err(at(LoginStep::SubmitMfa))?;
        // Armed before the click so the MFA page's own load never counts
        driver.arm_navigation();
        driver
            .click(selectors::MFA_SUBMIT)
            .await
            .map_err(at(LoginStep::SubmitMfa))?;

        debug!("[{}] {}", label, LoginStep::AwaitLanding);
        let landing = self.await_landing(driver, label).await;
        if !driver.is_connected() {
            return Err((
                LoginStep::AwaitLanding,
                DomainError::from(DriverError::Disconnected),
            ));
        }
        Ok(landing)
    }

    /// Navigation and the console anchor race; the first success wins and a
    /// failed branch leaves the other running. Both failing is not an error.
    async fn await_landing(&self, driver: &dyn LoginDriver, label: &str) -> LandingSignal {
        let bound = self.timeouts.landing;
        let navigation = driver.wait_for_navigation(bound);
        let anchor = driver.wait_visible(selectors::CONSOLE_ANCHOR, bound);
        tokio::pin!(navigation, anchor);

        let mut navigation_pending = true;
        let mut anchor_pending = true;

        loop {
            tokio::select! {
                biased;
                result = &mut navigation, if navigation_pending => match result {
                    Ok(()) => return LandingSignal::Navigation,
                    Err(e) => {
                        debug!("[{}] Navigation wait ended: {}", label, e);
                        navigation_pending = false;
                    }
                },
                result = &mut anchor, if anchor_pending => match result {
                    Ok(()) => return LandingSignal::ConsoleAnchor,
                    Err(e) => {
                        debug!("[{}] Console anchor wait ended: {}", label, e);
                        anchor_pending = false;
                    }
                },
                else => {
                    warn!("[{}] No landing signal within {:?}, continuing", label, bound);
                    return LandingSignal::TimedOut;
                }
            }
        }
    }
}
