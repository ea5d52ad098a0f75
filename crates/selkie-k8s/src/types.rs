// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

pub use k8s_openapi::api::core::v1::{
	Container, ContainerPort, EmptyDirVolumeSource, EnvVar, HTTPGetAction, Namespace, Pod,
	PodCondition, PodSpec, PodStatus, Probe, ResourceRequirements, Service, ServicePort,
	ServiceSpec, Volume, VolumeMount,
};
pub use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
pub use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
