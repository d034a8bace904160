//! AWS control-plane implementation

use crate::error::{delete_rejected, message, transport};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudformation::error::SdkError;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use downstack_core::{
    ControlPlane, Error, LifecycleStatus, ResourceHandle, ResourceKind, Result, SweepKind,
};

/// Connection parameters resolved from the CLI.
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    /// Named credentials profile; falls back to the default provider chain.
    pub profile: Option<String>,

    /// Region override; falls back to the profile/environment region.
    pub region: Option<String>,

    /// Bucket holding the environment's blob-store objects. Without it,
    /// `BucketPrefix` sweeps are skipped.
    pub artifact_bucket: Option<String>,
}

/// [`ControlPlane`] over CloudFormation and the sweep services.
pub struct AwsControlPlane {
    cfn: aws_sdk_cloudformation::Client,
    logs: aws_sdk_cloudwatchlogs::Client,
    ecr: aws_sdk_ecr::Client,
    ssm: aws_sdk_ssm::Client,
    secrets: aws_sdk_secretsmanager::Client,
    s3: aws_sdk_s3::Client,
    artifact_bucket: Option<String>,
}

impl AwsControlPlane {
    /// Resolve credentials/region and build the service clients.
    pub async fn connect(options: ConnectOptions) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = &options.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = &options.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let config = loader.load().await;

        tracing::debug!(
            profile = options.profile.as_deref().unwrap_or("<default>"),
            region = options.region.as_deref().unwrap_or("<default>"),
            "connected AWS clients"
        );

        Self {
            cfn: aws_sdk_cloudformation::Client::new(&config),
            logs: aws_sdk_cloudwatchlogs::Client::new(&config),
            ecr: aws_sdk_ecr::Client::new(&config),
            ssm: aws_sdk_ssm::Client::new(&config),
            secrets: aws_sdk_secretsmanager::Client::new(&config),
            s3: aws_sdk_s3::Client::new(&config),
            artifact_bucket: options.artifact_bucket,
        }
    }

    async fn stack_status(&self, name: &str) -> Result<LifecycleStatus> {
        match self.cfn.describe_stacks().stack_name(name).send().await {
            Ok(out) => Ok(out
                .stacks()
                .first()
                .and_then(|stack| stack.stack_status())
                .map(|status| LifecycleStatus::from_raw(status.as_str()))
                .unwrap_or(LifecycleStatus::Absent)),
            // CloudFormation reports a missing stack as a ValidationError,
            // not a dedicated not-found type.
            Err(SdkError::ServiceError(ctx)) => {
                let reason = message(ctx.err());
                if reason.contains("does not exist") {
                    Ok(LifecycleStatus::Absent)
                } else {
                    Err(Error::Transport(reason))
                }
            }
            Err(other) => Err(Error::Transport(format!("{other:?}"))),
        }
    }

    async fn sweep_status(&self, kind: SweepKind, name: &str) -> Result<LifecycleStatus> {
        match kind {
            SweepKind::LogGroup => {
                let out = self
                    .logs
                    .describe_log_groups()
                    .log_group_name_prefix(name)
                    .send()
                    .await
                    .map_err(transport)?;
                let found = out
                    .log_groups()
                    .iter()
                    .any(|group| group.log_group_name() == Some(name));
                Ok(present(found))
            }
            SweepKind::ImageRepository => {
                match self
                    .ecr
                    .describe_repositories()
                    .repository_names(name)
                    .send()
                    .await
                {
                    Ok(_) => Ok(LifecycleStatus::Active),
                    Err(e) => {
                        let se = e.into_service_error();
                        if se.is_repository_not_found_exception() {
                            Ok(LifecycleStatus::Absent)
                        } else {
                            Err(Error::Transport(message(&se)))
                        }
                    }
                }
            }
            SweepKind::Parameter => {
                match self.ssm.get_parameter().name(name).send().await {
                    Ok(_) => Ok(LifecycleStatus::Active),
                    Err(e) => {
                        let se = e.into_service_error();
                        if se.is_parameter_not_found() {
                            Ok(LifecycleStatus::Absent)
                        } else {
                            Err(Error::Transport(message(&se)))
                        }
                    }
                }
            }
            SweepKind::Secret => {
                match self.secrets.describe_secret().secret_id(name).send().await {
                    // A secret with a deletion date is scheduled for
                    // removal but still occupies the name.
                    Ok(out) => Ok(if out.deleted_date().is_some() {
                        LifecycleStatus::DeletePending
                    } else {
                        LifecycleStatus::Active
                    }),
                    Err(e) => {
                        let se = e.into_service_error();
                        if se.is_resource_not_found_exception() {
                            Ok(LifecycleStatus::Absent)
                        } else {
                            Err(Error::Transport(message(&se)))
                        }
                    }
                }
            }
            SweepKind::BucketPrefix => {
                let Some(bucket) = &self.artifact_bucket else {
                    return Ok(LifecycleStatus::Absent);
                };
                match self
                    .s3
                    .list_objects_v2()
                    .bucket(bucket)
                    .prefix(name)
                    .max_keys(1)
                    .send()
                    .await
                {
                    Ok(out) => Ok(present(out.key_count().unwrap_or(0) > 0)),
                    Err(e) => {
                        let se = e.into_service_error();
                        if se.is_no_such_bucket() {
                            Ok(LifecycleStatus::Absent)
                        } else {
                            Err(Error::Transport(message(&se)))
                        }
                    }
                }
            }
        }
    }

    async fn delete_sweep(&self, kind: SweepKind, name: &str) -> Result<()> {
        match kind {
            SweepKind::LogGroup => {
                match self.logs.delete_log_group().log_group_name(name).send().await {
                    Ok(_) => Ok(()),
                    Err(SdkError::ServiceError(ctx))
                        if ctx.err().is_resource_not_found_exception() =>
                    {
                        Ok(())
                    }
                    Err(other) => Err(delete_rejected(name, other)),
                }
            }
            SweepKind::ImageRepository => {
                match self
                    .ecr
                    .delete_repository()
                    .repository_name(name)
                    .force(true)
                    .send()
                    .await
                {
                    Ok(_) => Ok(()),
                    Err(SdkError::ServiceError(ctx))
                        if ctx.err().is_repository_not_found_exception() =>
                    {
                        Ok(())
                    }
                    Err(other) => Err(delete_rejected(name, other)),
                }
            }
            SweepKind::Parameter => {
                match self.ssm.delete_parameter().name(name).send().await {
                    Ok(_) => Ok(()),
                    Err(SdkError::ServiceError(ctx)) if ctx.err().is_parameter_not_found() => {
                        Ok(())
                    }
                    Err(other) => Err(delete_rejected(name, other)),
                }
            }
            SweepKind::Secret => {
                match self
                    .secrets
                    .delete_secret()
                    .secret_id(name)
                    .force_delete_without_recovery(true)
                    .send()
                    .await
                {
                    Ok(_) => Ok(()),
                    Err(SdkError::ServiceError(ctx))
                        if ctx.err().is_resource_not_found_exception() =>
                    {
                        Ok(())
                    }
                    Err(other) => Err(delete_rejected(name, other)),
                }
            }
            SweepKind::BucketPrefix => self.purge_prefix(name).await,
        }
    }

    /// Delete every object under `prefix`, page by page.
    async fn purge_prefix(&self, prefix: &str) -> Result<()> {
        let Some(bucket) = &self.artifact_bucket else {
            return Err(Error::InvalidConfig(
                "no artifact bucket configured for blob-store sweep".to_string(),
            ));
        };

        loop {
            let page = self
                .s3
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .send()
                .await
                .map_err(transport)?;

            let mut keys = Vec::new();
            for object in page.contents() {
                if let Some(key) = object.key() {
                    let id = ObjectIdentifier::builder()
                        .key(key)
                        .build()
                        .map_err(|e| Error::Transport(e.to_string()))?;
                    keys.push(id);
                }
            }
            if keys.is_empty() {
                return Ok(());
            }

            let count = keys.len();
            let delete = Delete::builder()
                .set_objects(Some(keys))
                .build()
                .map_err(|e| Error::Transport(e.to_string()))?;
            let out = self
                .s3
                .delete_objects()
                .bucket(bucket)
                .delete(delete)
                .send()
                .await
                .map_err(|e| delete_rejected(prefix, e))?;
            batch_delete_errors(prefix, out.errors())?;
            tracing::debug!(bucket, prefix, count, "deleted object batch");

            if !page.is_truncated().unwrap_or(false) {
                return Ok(());
            }
        }
    }
}

/// `DeleteObjects` answers 200 even when individual keys failed; those
/// failures arrive in the response body. Any one of them means the
/// prefix is not purged and must not read as success.
fn batch_delete_errors(prefix: &str, errors: &[aws_sdk_s3::types::Error]) -> Result<()> {
    let Some(first) = errors.first() else {
        return Ok(());
    };
    Err(Error::DeleteRejected {
        name: prefix.to_string(),
        reason: format!(
            "{} object(s) not deleted, first: {} ({})",
            errors.len(),
            first.key().unwrap_or("<unknown key>"),
            first.message().or(first.code()).unwrap_or("no detail"),
        ),
    })
}

fn present(found: bool) -> LifecycleStatus {
    if found {
        LifecycleStatus::Active
    } else {
        LifecycleStatus::Absent
    }
}

/// SSM wants hierarchy paths without a trailing slash.
fn parameter_path(prefix: &str) -> &str {
    if prefix.len() > 1 {
        prefix.trim_end_matches('/')
    } else {
        prefix
    }
}

#[async_trait]
impl ControlPlane for AwsControlPlane {
    fn name(&self) -> &str {
        "aws"
    }

    async fn status(&self, handle: &ResourceHandle) -> Result<LifecycleStatus> {
        match handle.kind {
            ResourceKind::Stack => self.stack_status(&handle.name).await,
            ResourceKind::Sweep(kind) => self.sweep_status(kind, &handle.name).await,
        }
    }

    async fn request_delete(&self, handle: &ResourceHandle) -> Result<()> {
        match handle.kind {
            ResourceKind::Stack => self
                .cfn
                .delete_stack()
                .stack_name(&handle.name)
                .send()
                .await
                .map(|_| ())
                .map_err(|e| delete_rejected(&handle.name, e)),
            ResourceKind::Sweep(kind) => self.delete_sweep(kind, &handle.name).await,
        }
    }

    async fn list(&self, kind: SweepKind, prefix: &str) -> Result<Vec<String>> {
        match kind {
            SweepKind::LogGroup => {
                let mut names = Vec::new();
                let mut token: Option<String> = None;
                loop {
                    let mut req = self
                        .logs
                        .describe_log_groups()
                        .log_group_name_prefix(prefix);
                    if let Some(t) = &token {
                        req = req.next_token(t);
                    }
                    let out = req.send().await.map_err(transport)?;
                    names.extend(
                        out.log_groups()
                            .iter()
                            .filter_map(|g| g.log_group_name().map(String::from)),
                    );
                    token = out.next_token().map(String::from);
                    if token.is_none() {
                        return Ok(names);
                    }
                }
            }
            SweepKind::ImageRepository => {
                let mut names = Vec::new();
                let mut token: Option<String> = None;
                loop {
                    let mut req = self.ecr.describe_repositories();
                    if let Some(t) = &token {
                        req = req.next_token(t);
                    }
                    let out = req.send().await.map_err(transport)?;
                    names.extend(
                        out.repositories()
                            .iter()
                            .filter_map(|r| r.repository_name())
                            .filter(|name| name.starts_with(prefix))
                            .map(String::from),
                    );
                    token = out.next_token().map(String::from);
                    if token.is_none() {
                        return Ok(names);
                    }
                }
            }
            SweepKind::Parameter => {
                let mut names = Vec::new();
                let mut token: Option<String> = None;
                loop {
                    let mut req = self
                        .ssm
                        .get_parameters_by_path()
                        .path(parameter_path(prefix))
                        .recursive(true);
                    if let Some(t) = &token {
                        req = req.next_token(t);
                    }
                    let out = req.send().await.map_err(transport)?;
                    names.extend(
                        out.parameters()
                            .iter()
                            .filter_map(|p| p.name().map(String::from)),
                    );
                    token = out.next_token().map(String::from);
                    if token.is_none() {
                        return Ok(names);
                    }
                }
            }
            SweepKind::Secret => {
                let mut names = Vec::new();
                let mut token: Option<String> = None;
                loop {
                    let mut req = self.secrets.list_secrets();
                    if let Some(t) = &token {
                        req = req.next_token(t);
                    }
                    let out = req.send().await.map_err(transport)?;
                    names.extend(
                        out.secret_list()
                            .iter()
                            .filter_map(|s| s.name())
                            .filter(|name| name.starts_with(prefix))
                            .map(String::from),
                    );
                    token = out.next_token().map(String::from);
                    if token.is_none() {
                        return Ok(names);
                    }
                }
            }
            // The prefix itself is the sweep unit: all objects under it
            // are deleted as one resource.
            SweepKind::BucketPrefix => {
                if self.sweep_status(kind, prefix).await? == LifecycleStatus::Absent {
                    Ok(Vec::new())
                } else {
                    Ok(vec![prefix.to_string()])
                }
            }
        }
    }
}
